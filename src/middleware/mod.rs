//! Request pipeline stages.
//!
//! [`crate::router::init_router`] applies them in this order, outermost first:
//!
//! 1. [`recovery`]: panic recovery
//! 2. [`cors`]: CORS headers, preflight short-circuit
//! 3. [`trace`]: trace id and [`RequestContext`](crate::context::RequestContext)
//! 4. [`logging`]: request/response logs and HTTP metrics
//! 5. [`envelope`]: renders `{success, data | error, meta}` bodies
//! 6. [`timeout`]: enforced request deadline
//! 7. [`auth`]: bearer-token verification (protected routes only)
//! 8. [`role`]: role gate (role-restricted groups only)
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use mbg::{policy::RouteGroup, router::{ApiRoutes, init_router}};
//!
//! let routes = ApiRoutes::new()
//!     .group(RouteGroup::Admin, Router::new().route("/api/v1/schools", get(list_schools)));
//! let app = init_router(state, routes);
//! ```

pub mod auth;
pub mod cors;
pub mod envelope;
pub mod logging;
pub mod recovery;
pub mod role;
pub mod timeout;
pub mod trace;
