use serde::Deserialize;

use crate::item::ItemStack;

use condition::{LootCondition, test_conditions};
use context::LootContext;
use entry::{LootCandidates, LootPoolEntry};
use function::{LootFunction, apply_functions};
use number::NumberProvider;

pub mod condition;
pub mod context;
pub mod entry;
pub mod function;
pub mod number;

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LootTable {
    #[serde(default)]
    pub pools: Vec<LootPool>,
    #[serde(default)]
    pub functions: Vec<LootFunction>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LootPool {
    pub entries: Vec<LootPoolEntry>,
    #[serde(default)]
    pub rolls: NumberProvider,
    #[serde(default)]
    pub bonus_rolls: NumberProvider,
    #[serde(default)]
    pub conditions: Vec<LootCondition>,
    #[serde(default)]
    pub functions: Vec<LootFunction>,
}

impl LootTable {
    /// Runs every pool in order and collects the non-empty drops.
    pub fn generate(&self, context: &mut LootContext) -> Vec<ItemStack> {
        let mut items = Vec::new();
        self.generate_into(context, &mut |stack, _| {
            if stack.is_empty() {
                log::trace!("Dropping empty stack of {}", stack.id);
            } else {
                items.push(stack);
            }
        });
        items
    }

    /// Feeds every drop, after the table functions, into `sink`.
    ///
    /// Nested tables use this so that their drops also pass through the functions of the
    /// entry and pool that referenced them.
    pub fn generate_into<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        let mut decorated = |stack: ItemStack, context: &mut LootContext<'a>| {
            let stack = apply_functions(&self.functions, stack, context);
            sink(stack, context);
        };
        for pool in &self.pools {
            pool.generate_into(context, &mut decorated);
        }
    }
}

impl LootPool {
    /// `floor(rolls) + floor(bonus_rolls * luck)`, never negative.
    pub fn rolls(&self, context: &mut LootContext) -> i32 {
        let rolls = self.rolls.get_floored_int(context);
        let bonus = (self.bonus_rolls.get_float(context) * context.luck).floor() as i32;
        rolls.saturating_add(bonus).max(0)
    }

    pub fn generate_into<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        if !test_conditions(&self.conditions, context) {
            log::trace!("Pool skipped, conditions failed");
            return;
        }
        let mut decorated = |stack: ItemStack, context: &mut LootContext<'a>| {
            let stack = apply_functions(&self.functions, stack, context);
            sink(stack, context);
        };
        let rolls = self.rolls(context);
        for _ in 0..rolls {
            self.roll(context, &mut decorated);
        }
    }

    /// One roll: expand the entries, pick one candidate, produce its items.
    fn roll<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        let mut candidates = LootCandidates::default();
        for entry in &self.entries {
            entry.expand(context, &mut candidates);
        }
        match candidates.select(&mut context.random) {
            Some(candidate) => candidate.create_items(context, sink),
            None => log::trace!("Roll produced no candidates"),
        }
    }
}
