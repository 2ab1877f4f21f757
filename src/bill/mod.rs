pub mod derive;
pub mod handlers;
pub mod model;
pub mod validation;
pub mod words;

pub use handlers::*;
pub use model::*;
