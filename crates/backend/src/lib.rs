//! Fyyur: a listings site for venues, artists and the shows that bring them
//! together.

pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod services;
pub mod templates;

pub use config::AppConfig;
pub use routes::app_router;
