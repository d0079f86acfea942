pub mod analytics;
pub mod api;
pub mod cli;
pub mod core;
pub mod email;
pub mod query;
pub mod responder;
