use std::{collections::BTreeMap, fmt};

use lootsim_config::SimulationConfiguration;
use lootsim_engine::{ItemStack, LootContext, LootLookup, LootTable};
use lootsim_util::{
    DataVersion, Weather,
    random::{RandomImpl, legacy_rand::LegacyRand},
};
use rayon::prelude::*;
use serde::Serialize;

use crate::bounded::BoundedLookup;

/// The situation every run of a batch shares.
#[derive(Clone, Copy, Debug)]
pub struct SimulationSettings {
    pub luck: f32,
    pub weather: Weather,
    pub day_time: i64,
    pub enchantment_level: i32,
    pub version: DataVersion,
    pub max_table_references: u32,
}

impl From<&SimulationConfiguration> for SimulationSettings {
    fn from(config: &SimulationConfiguration) -> Self {
        Self {
            luck: config.luck,
            weather: config.weather,
            day_time: config.day_time,
            enchantment_level: config.enchantment_level,
            version: config.version,
            max_table_references: config.max_table_references,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::from(&SimulationConfiguration::default())
    }
}

/// Runs `table` once with its own random source.
pub fn simulate(
    table: &LootTable,
    lookup: &dyn LootLookup,
    settings: &SimulationSettings,
    seed: u64,
) -> Vec<ItemStack> {
    let bounded = BoundedLookup::new(lookup, settings.max_table_references);
    let mut context = LootContext::new(seed, &bounded)
        .with_luck(settings.luck)
        .with_weather(settings.weather)
        .with_day_time(settings.day_time)
        .with_enchantment_level(settings.enchantment_level)
        .with_version(settings.version);
    table.generate(&mut context)
}

/// Seeds for `runs` runs, drawn from a generator seeded with `base_seed`.
///
/// Consecutive seeds make the first draws of neighbouring runs correlated, so they are not
/// used directly.
pub fn run_seeds(base_seed: u64, runs: u32) -> Vec<u64> {
    let mut seeds = LegacyRand::from_seed(base_seed);
    (0..runs).map(|_| seeds.next_i64() as u64).collect()
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemTally {
    /// Runs that dropped the item at least once.
    pub runs: u32,
    /// Sum of all dropped counts over every run.
    pub total_count: i64,
}

/// Aggregated drops of a batch, ordered by item id.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub runs: u32,
    pub items: BTreeMap<String, ItemTally>,
}

impl BatchReport {
    pub fn from_run(items: &[ItemStack]) -> Self {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for item in items {
            *counts.entry(item.id.clone()).or_default() += i64::from(item.item_count);
        }
        Self {
            runs: 1,
            items: counts
                .into_iter()
                .map(|(id, total_count)| {
                    (
                        id,
                        ItemTally {
                            runs: 1,
                            total_count,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.runs += other.runs;
        for (id, tally) in other.items {
            let entry = self.items.entry(id).or_default();
            entry.runs += tally.runs;
            entry.total_count += tally.total_count;
        }
        self
    }

    /// Share of runs that dropped `id`.
    pub fn chance(&self, id: &str) -> f64 {
        match self.items.get(id) {
            Some(tally) if self.runs > 0 => f64::from(tally.runs) / f64::from(self.runs),
            _ => 0.0,
        }
    }

    /// Average dropped count of `id` per run, counting runs without the item as zero.
    pub fn average_count(&self, id: &str) -> f64 {
        match self.items.get(id) {
            Some(tally) if self.runs > 0 => tally.total_count as f64 / f64::from(self.runs),
            _ => 0.0,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} runs", self.runs)?;
        for (id, tally) in &self.items {
            writeln!(
                f,
                "{id:<40} {:>7.3}% {:>9.3} avg ({} runs)",
                self.chance(id) * 100.0,
                self.average_count(id),
                tally.runs
            )?;
        }
        Ok(())
    }
}

/// Runs the batch across the rayon pool. Each run owns its random source, so the report
/// only depends on `base_seed` and `runs`.
pub fn run_batch(
    table: &LootTable,
    lookup: &(dyn LootLookup + Sync),
    settings: &SimulationSettings,
    base_seed: u64,
    runs: u32,
) -> BatchReport {
    let report = run_seeds(base_seed, runs)
        .into_par_iter()
        .map(|seed| BatchReport::from_run(&simulate(table, lookup, settings, seed)))
        .reduce(BatchReport::default, BatchReport::merge);
    log::debug!("Batch of {runs} runs dropped {} distinct items", report.items.len());
    report
}

#[cfg(test)]
mod test {
    use lootsim_engine::{EmptyLookup, ItemStack, LootTable};
    use lootsim_util::{DataVersion, Weather};

    use crate::registry::LootRegistry;

    use super::{BatchReport, SimulationSettings, run_batch, run_seeds, simulate};

    fn table(json: &str) -> LootTable {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn seeds_are_reproducible() {
        let seeds = run_seeds(42, 4);
        assert_eq!(seeds.len(), 4);
        assert_eq!(seeds, run_seeds(42, 4));
        assert_ne!(seeds, run_seeds(43, 4));
    }

    #[test]
    fn settings_reach_the_context() {
        let table = table(
            r#"{"pools":[{"rolls":1,"entries":[
                {"type":"minecraft:item","name":"minecraft:sponge","conditions":[{"condition":"minecraft:weather_check","raining":true}]},
                {"type":"minecraft:item","name":"minecraft:dead_bush","conditions":[{"condition":"minecraft:weather_check","raining":false}]}
            ]}]}"#,
        );
        let dry = simulate(&table, &EmptyLookup, &SimulationSettings::default(), 0);
        assert_eq!(dry, vec![ItemStack::new(1, "minecraft:dead_bush")]);

        let settings = SimulationSettings {
            weather: Weather::Thunder,
            version: DataVersion::Legacy,
            ..Default::default()
        };
        let wet = simulate(&table, &EmptyLookup, &settings, 0);
        assert_eq!(wet, vec![ItemStack::new(1, "minecraft:sponge")]);
    }

    #[test]
    fn report_merges_runs() {
        let first = BatchReport::from_run(&[
            ItemStack::new(2, "minecraft:bone"),
            ItemStack::new(3, "minecraft:bone"),
        ]);
        let second = BatchReport::from_run(&[ItemStack::new(1, "minecraft:arrow")]);
        let third = BatchReport::from_run(&[]);
        let report = first.merge(second).merge(third);

        assert_eq!(report.runs, 3);
        assert_eq!(report.items["minecraft:bone"].runs, 1);
        assert_eq!(report.items["minecraft:bone"].total_count, 5);
        lootsim_util::assert_eq_delta!(report.chance("minecraft:arrow"), 1.0_f64 / 3.0, 1e-9);
        lootsim_util::assert_eq_delta!(report.average_count("minecraft:bone"), 5.0_f64 / 3.0, 1e-9);
        assert_eq!(report.chance("minecraft:dirt"), 0.0);
    }

    #[test]
    fn batch_is_deterministic() {
        let table = table(
            r#"{"pools":[{"rolls":{"type":"minecraft:uniform","min":0,"max":3},"entries":[
                {"type":"minecraft:item","name":"minecraft:a","weight":1},
                {"type":"minecraft:item","name":"minecraft:b","weight":3,
                 "functions":[{"function":"minecraft:set_count","count":{"type":"minecraft:uniform","min":1,"max":4}}]}
            ]}]}"#,
        );
        let registry = LootRegistry::default();
        let settings = SimulationSettings::default();
        let first = run_batch(&table, &registry, &settings, 7, 500);
        let second = run_batch(&table, &registry, &settings, 7, 500);
        assert_eq!(first, second);
        assert_eq!(first.runs, 500);

        let serial = run_seeds(7, 500)
            .into_iter()
            .map(|seed| BatchReport::from_run(&simulate(&table, &registry, &settings, seed)))
            .fold(BatchReport::default(), BatchReport::merge);
        assert_eq!(first, serial);
    }

    #[test]
    fn report_json() {
        let report = BatchReport::from_run(&[ItemStack::new(2, "minecraft:bone")]);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"runs":1,"items":{"minecraft:bone":{"runs":1,"total_count":2}}})
        );
    }
}
