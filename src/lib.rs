pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod types;
pub mod validator;

pub use routes::app;
pub use state::AppState;
