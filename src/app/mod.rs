pub mod context;
pub mod enroller;
pub mod session;

pub use context::AppContext;
pub use enroller::Enroller;
pub use session::{Session, SessionFactory};
