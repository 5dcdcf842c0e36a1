pub mod handlers;
pub mod models;
pub mod multipart;
pub mod server;
pub mod session;
pub mod templates;
