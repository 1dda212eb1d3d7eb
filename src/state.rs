use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Generation runs share fixed output file names in the working
    /// directory, so only one may run at a time.
    pub generation_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> AppState {
        AppState {
            config: Arc::new(config),
            generation_lock: Arc::new(Mutex::new(())),
        }
    }
}
