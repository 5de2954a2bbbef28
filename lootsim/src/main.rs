#![deny(clippy::all)]
// use log crate
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use lootsim::{
    batch::{SimulationSettings, run_batch, simulate},
    init_log,
    registry::LootRegistry,
};
use lootsim_config::{LoadConfiguration, SimulationConfiguration};
use lootsim_engine::LootTable;
use lootsim_util::{DataVersion, Weather, random::get_seed};

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulates Minecraft loot tables with the game's random number generator.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Loot table JSON file to simulate
    table: PathBuf,
    /// Datapack directory providing item tags, nested tables and predicates
    #[arg(long)]
    data: Option<PathBuf>,
    /// Seed of the first run; random when neither this nor the config sets one
    #[arg(long)]
    seed: Option<u64>,
    /// Number of runs; more than one prints an aggregated report
    #[arg(long)]
    runs: Option<u32>,
    #[arg(long, allow_hyphen_values = true)]
    luck: Option<f32>,
    /// clear, rain or thunder
    #[arg(long, value_parser = parse_weather)]
    weather: Option<Weather>,
    /// Time of day in ticks
    #[arg(long)]
    day_time: Option<i64>,
    /// Level of the tool or weapon enchantment bonus conditions and functions read
    #[arg(long)]
    enchantment_level: Option<i32>,
    /// Treat the data as pre-1.20.5 (NBT instead of item components)
    #[arg(long)]
    legacy: bool,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
    /// Directory holding `config/simulation.toml`
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

fn parse_weather(value: &str) -> Result<Weather, String> {
    match value.to_ascii_lowercase().as_str() {
        "clear" => Ok(Weather::Clear),
        "rain" => Ok(Weather::Rain),
        "thunder" => Ok(Weather::Thunder),
        other => Err(format!("unknown weather {other}, expected clear, rain or thunder")),
    }
}

impl Cli {
    fn apply(&self, config: &mut SimulationConfiguration) {
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(luck) = self.luck {
            config.luck = luck;
        }
        if let Some(weather) = self.weather {
            config.weather = weather;
        }
        if let Some(day_time) = self.day_time {
            config.day_time = day_time;
        }
        if let Some(level) = self.enchantment_level {
            config.enchantment_level = level;
        }
        if self.legacy {
            config.version = DataVersion::Legacy;
        }
    }

    fn seed(&self, config: &SimulationConfiguration) -> u64 {
        match (self.seed, config.base_seed) {
            (Some(seed), _) => seed,
            (None, 0) => get_seed(),
            (None, seed) => seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = SimulationConfiguration::load(&cli.config_dir)?;
    cli.apply(&mut config);
    config.validate()?;

    init_log!(config.logging)?;
    log::debug!("lootsim {CARGO_PKG_VERSION}, {config:?}");

    let content = fs::read_to_string(&cli.table)
        .with_context(|| format!("couldn't read {}", cli.table.display()))?;
    let table: LootTable = serde_json::from_str(&content)
        .with_context(|| format!("couldn't parse {}", cli.table.display()))?;

    let registry = match &cli.data {
        Some(dir) => LootRegistry::load(dir)?,
        None => LootRegistry::default(),
    };

    let seed = cli.seed(&config);
    let settings = SimulationSettings::from(&config);
    log::info!("Simulating {} with seed {seed}", cli.table.display());

    let mut stdout = io::stdout().lock();
    if config.runs == 1 {
        let items = simulate(&table, &registry, &settings, seed);
        if cli.json {
            serde_json::to_writer_pretty(&mut stdout, &items)?;
            writeln!(stdout)?;
        } else {
            for item in &items {
                write!(stdout, "{} {}", item.item_count, item.id)?;
                if !item.components.is_empty() {
                    write!(stdout, " {}", serde_json::to_string(&item.components)?)?;
                }
                writeln!(stdout)?;
            }
        }
    } else {
        let report = run_batch(&table, &registry, &settings, seed, config.runs);
        if cli.json {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        } else {
            write!(stdout, "{report}")?;
        }
    }
    Ok(())
}
