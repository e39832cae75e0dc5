pub mod middleware;
pub mod router;
pub mod routes;
pub mod types;
pub mod handlers {
    pub mod batteries;
    pub mod common;
    pub mod health;
    pub mod materials;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
