use crate::config::Config;
use crate::external::mes::DocumentSink;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub mes: Arc<dyn DocumentSink>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config, mes: Arc<dyn DocumentSink>) -> Self {
        Self { db, config, mes }
    }
}
