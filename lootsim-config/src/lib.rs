use std::{
    fs,
    path::{Path, PathBuf},
};

use log::warn;
use logging::LoggingConfig;
use lootsim_util::{DataVersion, Weather};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub mod logging;

const CONFIG_ROOT_FOLDER: &str = "config/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couldn't access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("couldn't parse config at {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Defaults for every simulation. Command line flags take precedence over these.
///
/// The defaults describe a plain vanilla situation: no luck, clear weather, no enchantments.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct SimulationConfiguration {
    /// Luck of the player the loot is generated for.
    pub luck: f32,
    pub weather: Weather,
    /// Time of day in ticks.
    pub day_time: i64,
    /// Level of the tool or weapon enchantment that bonus conditions and functions read.
    pub enchantment_level: i32,
    /// Item data shape of the datapack: `legacy` NBT or `modern` components.
    pub version: DataVersion,
    /// How many simulations a batch runs.
    pub runs: u32,
    /// Seed used when none is given on the command line. `0` picks a random one.
    pub base_seed: u64,
    /// How many nested tables a single run may resolve before refusing further lookups.
    pub max_table_references: u32,
    pub logging: LoggingConfig,
}

impl Default for SimulationConfiguration {
    fn default() -> Self {
        Self {
            luck: 0.0,
            weather: Weather::Clear,
            day_time: 0,
            enchantment_level: 0,
            version: DataVersion::Modern,
            runs: 1,
            base_seed: 0,
            max_table_references: 64,
            logging: LoggingConfig::default(),
        }
    }
}

pub trait LoadConfiguration {
    /// Reads the configuration below `exec_dir`, writing the defaults out first if the file
    /// does not exist yet.
    fn load(exec_dir: &Path) -> Result<Self, ConfigError>
    where
        Self: Sized + Default + Serialize + DeserializeOwned,
    {
        let config_dir = exec_dir.join(CONFIG_ROOT_FOLDER);
        if !config_dir.exists() {
            log::debug!("creating new config root folder");
            fs::create_dir(&config_dir).map_err(|source| ConfigError::Io {
                path: config_dir.clone(),
                source,
            })?;
        }
        let path = config_dir.join(Self::get_path());

        let config = if path.exists() {
            let file_content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&file_content).map_err(|err| ConfigError::Parse {
                path: path.clone(),
                message: err.message().to_string(),
            })?
        } else {
            let content = Self::default();
            match toml::to_string(&content) {
                Ok(serialized) => {
                    if let Err(err) = fs::write(&path, serialized) {
                        warn!("Couldn't write default config to {:?}. Reason: {}", &path, err);
                    }
                }
                Err(err) => warn!("Couldn't serialize default config. Reason: {err}"),
            }
            content
        };

        config.validate()?;
        Ok(config)
    }

    fn get_path() -> &'static Path;

    fn validate(&self) -> Result<(), ConfigError>;
}

impl LoadConfiguration for SimulationConfiguration {
    fn get_path() -> &'static Path {
        Path::new("simulation.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::Invalid("runs must be at least 1"));
        }
        if self.enchantment_level < 0 {
            return Err(ConfigError::Invalid("enchantment_level can't be negative"));
        }
        if self.max_table_references == 0 {
            return Err(ConfigError::Invalid(
                "max_table_references must be at least 1",
            ));
        }
        Ok(())
    }
}
