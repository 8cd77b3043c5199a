//! HTTP request handlers.

pub mod health;
pub mod publish;
pub mod site;

pub use health::health_check;
pub use publish::publish;
pub use site::serve_site;
