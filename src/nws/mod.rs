pub mod cache;
pub mod client;
pub mod error;
pub mod payload;
pub mod points;
pub mod retry;
pub mod validate;
