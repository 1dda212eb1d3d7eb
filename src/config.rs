use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: String,
    /// Directory the analyzer runs in: pattern files, clones,
    /// `generatedJson.json` and the treemap artifacts all live here.
    pub work_dir: PathBuf,
    /// Analyzer executable invoked for the ingestion and report passes.
    pub analyzer_bin: String,
    /// Parents kept in the truncated treemap document.
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5500".to_string(),
            work_dir: PathBuf::from("."),
            analyzer_bin: "git-diffmap".to_string(),
            page_size: 100,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("DIFFMAP_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(dir) = std::env::var("DIFFMAP_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }
        if let Ok(bin) = std::env::var("DIFFMAP_ANALYZER_BIN") {
            config.analyzer_bin = bin;
        }
        if let Ok(val) = std::env::var("DIFFMAP_PAGE_SIZE") {
            if let Ok(v) = val.parse() {
                config.page_size = v;
            }
        }

        config
    }
}
