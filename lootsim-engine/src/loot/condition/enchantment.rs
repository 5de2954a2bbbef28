use serde::Deserialize;

use crate::loot::{context::LootContext, number::LevelBasedValue};

// All three read `LootContext::enchantment_level`, which is 0 unless the host supplies a level.

/// Pre 1.21 `random_chance_with_looting`.
#[derive(Deserialize, Clone, Debug)]
pub struct LootingChance {
    pub chance: f32,
    pub looting_multiplier: f32,
}

impl LootingChance {
    pub fn test(&self, context: &mut LootContext) -> bool {
        let chance = self.chance + context.enchantment_level as f32 * self.looting_multiplier;
        context.next_f32() < chance
    }
}

/// 1.21 `random_chance_with_enchanted_bonus`.
#[derive(Deserialize, Clone, Debug)]
pub struct EnchantedBonusChance {
    #[serde(default)]
    pub enchantment: Option<String>,
    pub unenchanted_chance: f32,
    pub enchanted_chance: LevelBasedValue,
}

impl EnchantedBonusChance {
    pub fn test(&self, context: &mut LootContext) -> bool {
        let level = context.enchantment_level;
        let chance = if level > 0 {
            self.enchanted_chance.calculate(level)
        } else {
            self.unenchanted_chance
        };
        context.next_f32() < chance
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TableBonus {
    #[serde(default)]
    pub enchantment: Option<String>,
    #[serde(default)]
    pub chances: Vec<f32>,
}

impl TableBonus {
    /// Levels past the end of `chances` use the last chance. No chances means no draw.
    pub fn test(&self, context: &mut LootContext) -> bool {
        let Some(last) = self.chances.len().checked_sub(1) else {
            return false;
        };
        let index = (context.enchantment_level.max(0) as usize).min(last);
        let chance = self.chances[index];
        context.next_f32() < chance
    }
}
