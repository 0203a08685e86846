// HTTP API surface.

pub mod errors;
pub mod models;
pub mod queries;
