use serde::Deserialize;

use crate::loot::context::LootContext;

#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum LootFunctionBonusParameter {
    Multiplier {
        #[serde(rename = "bonusMultiplier")]
        bonus_multiplier: i32,
    },
    Probability {
        extra: i32,
        probability: f32,
    },
}

/// The three `apply_bonus` formulas. A formula without matching parameters, or one this
/// engine does not know, leaves the count alone.
pub(super) fn apply_bonus(
    formula: &str,
    parameters: Option<&LootFunctionBonusParameter>,
    count: i32,
    context: &mut LootContext,
) -> i32 {
    let level = context.enchantment_level;
    match (formula.trim_start_matches("minecraft:"), parameters) {
        ("ore_drops", _) => {
            if level > 0 {
                let bonus = (context.next_bounded_i32(level.saturating_add(2)) - 1).max(0);
                count.saturating_mul(bonus + 1)
            } else {
                count
            }
        }
        (
            "uniform_bonus_count",
            Some(LootFunctionBonusParameter::Multiplier { bonus_multiplier }),
        ) => count.saturating_add(
            context.next_bounded_i32(bonus_multiplier.saturating_mul(level).saturating_add(1)),
        ),
        (
            "binomial_with_bonus_count",
            Some(LootFunctionBonusParameter::Probability { extra, probability }),
        ) => {
            let mut count = count;
            for _ in 0..level.saturating_add(*extra) {
                if context.next_f32() < *probability {
                    count = count.saturating_add(1);
                }
            }
            count
        }
        (formula, _) => {
            log::trace!("apply_bonus formula {formula} left the count unchanged");
            count
        }
    }
}
