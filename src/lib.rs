pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod record;
pub mod services;
pub mod state;

pub use handlers::router;
pub use state::AppState;
