pub mod controller;
pub mod model;
pub mod router;

pub use router::{init_health_details_router, init_health_router};
