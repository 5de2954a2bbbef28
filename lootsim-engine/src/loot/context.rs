use lootsim_util::{
    DataVersion, Weather,
    random::{RandomImpl, legacy_rand::LegacyRand},
};

use super::{LootTable, condition::LootCondition};

/// Data the engine cannot know by itself: tag contents, other tables and named predicates.
///
/// A missing tag is an empty list, a missing table is `None` (nothing drops) and a missing
/// predicate is an empty condition list, which passes.
pub trait LootLookup {
    fn item_tag(&self, tag: &str) -> Vec<String>;

    fn loot_table(&self, id: &str) -> Option<LootTable>;

    fn predicate(&self, name: &str) -> Vec<LootCondition>;
}

/// Lookup that knows nothing.
pub struct EmptyLookup;

impl LootLookup for EmptyLookup {
    fn item_tag(&self, _tag: &str) -> Vec<String> {
        Vec::new()
    }

    fn loot_table(&self, _id: &str) -> Option<LootTable> {
        None
    }

    fn predicate(&self, _name: &str) -> Vec<LootCondition> {
        Vec::new()
    }
}

/// State of one simulation run.
///
/// The random source is the only thing that changes while a table generates. It is owned by
/// the context and every evaluator borrows the context mutably, so draws always happen in
/// call order.
pub struct LootContext<'a> {
    pub random: LegacyRand,
    pub luck: f32,
    pub weather: Weather,
    pub day_time: i64,
    /// Level of the enchantment that `table_bonus`, `apply_bonus` and the looting chance
    /// conditions read. No equipment is simulated, so it stays `0` unless the host sets it.
    pub enchantment_level: i32,
    pub version: DataVersion,
    lookup: &'a dyn LootLookup,
}

impl<'a> LootContext<'a> {
    pub fn new(seed: u64, lookup: &'a dyn LootLookup) -> Self {
        Self {
            random: LegacyRand::from_seed(seed),
            luck: 0.0,
            weather: Weather::Clear,
            day_time: 0,
            enchantment_level: 0,
            version: DataVersion::default(),
            lookup,
        }
    }

    pub fn with_luck(mut self, luck: f32) -> Self {
        self.luck = luck;
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_day_time(mut self, day_time: i64) -> Self {
        self.day_time = day_time;
        self
    }

    pub fn with_enchantment_level(mut self, level: i32) -> Self {
        self.enchantment_level = level.max(0);
        self
    }

    pub fn with_version(mut self, version: DataVersion) -> Self {
        self.version = version;
        self
    }

    pub fn lookup(&self) -> &'a dyn LootLookup {
        self.lookup
    }

    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.random.next_f32()
    }

    #[inline]
    pub fn next_bounded_i32(&mut self, bound: i32) -> i32 {
        self.random.next_bounded_i32(bound)
    }
}
