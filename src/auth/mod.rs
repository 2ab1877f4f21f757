pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod model;

pub use handlers::config;
pub use middleware::{authenticate, require_admin};
pub use model::{Claims, Role, User, UserInfo};
