pub mod api;
mod models;

pub use models::*;
