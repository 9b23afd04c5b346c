pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod push;
pub mod registry;
pub mod routes;

use config::Config;
use registry::ConnectionRegistry;
use std::sync::Arc;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub registry: Arc<ConnectionRegistry>,
}
