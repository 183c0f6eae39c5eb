use std::sync::Arc;

use axum::{
    Router,
    http::{Method, Uri, header},
    middleware,
    routing::get,
};
use mbg_auth::RoleSet;
use mbg_core::AppError;
use tower::ServiceBuilder;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

use crate::docs::ApiDoc;
use crate::middleware::{
    auth::require_auth,
    cors::cors,
    envelope::finalize_envelope,
    logging::log_requests,
    recovery::recover_panics,
    role::{RoleGate, require_roles},
    timeout::enforce_timeout,
    trace::assign_trace_id,
};
use crate::modules::auth::{init_auth_router, init_session_auth_router};
use crate::modules::health::{init_health_details_router, init_health_router};
use crate::modules::roles::init_roles_router;
use crate::modules::session::init_session_router;
use crate::policy::RouteGroup;
use crate::state::AppState;

enum Access {
    Public,
    Authenticated,
    Group(RouteGroup),
    Roles(RoleSet),
}

/// Entity routers to mount behind the pipeline, each with its access level.
///
/// Role sets for [`ApiRoutes::group`] are read from the state's
/// [`RouteGroupPolicy`](crate::policy::RouteGroupPolicy) when the router is built.
#[derive(Default)]
pub struct ApiRoutes {
    routes: Vec<(Access, Router<AppState>)>,
}

impl ApiRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// No token required.
    pub fn public(mut self, router: Router<AppState>) -> Self {
        self.routes.push((Access::Public, router));
        self
    }

    /// Any valid token.
    pub fn protected(mut self, router: Router<AppState>) -> Self {
        self.routes.push((Access::Authenticated, router));
        self
    }

    /// Valid token whose role is admitted by `group`.
    pub fn group(mut self, group: RouteGroup, router: Router<AppState>) -> Self {
        self.routes.push((Access::Group(group), router));
        self
    }

    /// Valid token whose role is in `roles`.
    pub fn restricted(mut self, roles: impl Into<RoleSet>, router: Router<AppState>) -> Self {
        self.routes.push((Access::Roles(roles.into()), router));
        self
    }

    fn builtin() -> Self {
        Self::new()
            .public(init_health_router())
            .public(Router::new().nest("/api/v1/auth", init_auth_router()))
            .protected(
                Router::new()
                    .nest(
                        "/api/v1/auth",
                        init_session_auth_router().merge(init_session_router()),
                    )
                    .nest("/api/v1/health", init_health_details_router()),
            )
            .group(
                RouteGroup::SuperAdmin,
                Router::new().nest("/api/v1/roles", init_roles_router()),
            )
    }
}

fn authenticated(state: &AppState, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

fn gated(state: &AppState, gate: RoleGate, router: Router<AppState>) -> Router<AppState> {
    let router = router.route_layer(middleware::from_fn_with_state(Arc::new(gate), require_roles));
    authenticated(state, router)
}

fn mount(state: &AppState, access: Access, router: Router<AppState>) -> Router<AppState> {
    // `route_layer` rejects routers without routes.
    if !router.has_routes() {
        return router;
    }
    match access {
        Access::Public => router,
        Access::Authenticated => authenticated(state, router),
        Access::Group(group) => {
            let gate = RoleGate::new(group.as_str(), state.policy.roles(group).clone());
            gated(state, gate, router)
        }
        Access::Roles(roles) => gated(state, RoleGate::new("restricted", roles), router),
    }
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("Route {} {} not found", method, uri.path()))
}

/// Builds the application: built-in routes plus `routes`, all wrapped in the
/// request pipeline.
pub fn init_router(state: AppState, routes: ApiRoutes) -> Router {
    let mut app = Router::new().merge(Scalar::with_url("/scalar", ApiDoc::openapi()));

    for (access, router) in ApiRoutes::builtin().routes.into_iter().chain(routes.routes) {
        app = app.merge(mount(&state, access, router));
    }

    if let Some(handle) = state.metrics.clone() {
        app = app.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    app.fallback(route_not_found)
        .with_state(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(SetSensitiveRequestHeadersLayer::new([header::AUTHORIZATION]))
                .layer(middleware::from_fn(recover_panics))
                .layer(middleware::from_fn_with_state(state.clone(), cors))
                .layer(middleware::from_fn(assign_trace_id))
                .layer(middleware::from_fn(log_requests))
                .layer(middleware::from_fn(finalize_envelope))
                .layer(middleware::from_fn_with_state(state, enforce_timeout)),
        )
}
