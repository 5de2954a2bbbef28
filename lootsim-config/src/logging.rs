use log::LevelFilter;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: LevelFilter,
    pub threads: bool,
    pub color: bool,
    pub timestamp: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Info,
            threads: false,
            color: true,
            timestamp: false,
        }
    }
}
