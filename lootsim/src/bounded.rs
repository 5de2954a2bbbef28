use std::cell::Cell;

use lootsim_engine::{LootLookup, LootTable, loot::condition::LootCondition};

/// Limits how many nested tables one run may pull from `inner`.
///
/// The engine follows table references blindly, so a table that references itself would
/// never finish. Once the budget is spent every further table lookup answers `None`, which
/// drops nothing. Create one per run.
pub struct BoundedLookup<'l> {
    inner: &'l dyn LootLookup,
    remaining: Cell<u32>,
    warned: Cell<bool>,
}

impl<'l> BoundedLookup<'l> {
    pub fn new(inner: &'l dyn LootLookup, max_table_references: u32) -> Self {
        Self {
            inner,
            remaining: Cell::new(max_table_references),
            warned: Cell::new(false),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.get()
    }
}

impl LootLookup for BoundedLookup<'_> {
    fn item_tag(&self, tag: &str) -> Vec<String> {
        self.inner.item_tag(tag)
    }

    fn loot_table(&self, id: &str) -> Option<LootTable> {
        let Some(remaining) = self.remaining.get().checked_sub(1) else {
            if !self.warned.replace(true) {
                log::warn!("Table reference budget exhausted at {id}, further references drop nothing");
            }
            return None;
        };
        self.remaining.set(remaining);
        self.inner.loot_table(id)
    }

    fn predicate(&self, name: &str) -> Vec<LootCondition> {
        self.inner.predicate(name)
    }
}
