use serde::Deserialize;

use super::context::LootContext;

/// A possibly random number, as written in `rolls`, `count`, `chance` and range bounds.
///
/// Unrecognised provider types evaluate to `0`.
// Constant must come first: the object form accepts any value through its unknown variant.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum NumberProvider {
    Constant(f32),
    Object(NormalNumberProvider),
}

impl Default for NumberProvider {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type")]
pub enum NormalNumberProvider {
    #[serde(rename = "minecraft:constant", alias = "constant")]
    Constant(ConstantNumberProvider),
    #[serde(rename = "minecraft:uniform", alias = "uniform")]
    Uniform(UniformNumberProvider),
    #[serde(rename = "minecraft:binomial", alias = "binomial")]
    Binomial(BinomialNumberProvider),
    /// Scoreboards do not exist in the simulation.
    #[serde(rename = "minecraft:score", alias = "score")]
    Score,
    /// Command storage does not exist in the simulation.
    #[serde(rename = "minecraft:storage", alias = "storage")]
    Storage,
    #[serde(rename = "minecraft:enchantment_level", alias = "enchantment_level")]
    EnchantmentLevel { amount: LevelBasedValue },
    /// An object without `type` that has `min` and `max` is a uniform provider.
    #[serde(untagged)]
    UntypedUniform(UniformNumberProvider),
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

impl NumberProvider {
    pub fn get_int(&self, context: &mut LootContext) -> i32 {
        match self {
            NumberProvider::Constant(value) => round(*value),
            NumberProvider::Object(provider) => provider.get_int(context),
        }
    }

    /// Like [`Self::get_int`], but fractional constants are floored instead of rounded.
    pub fn get_floored_int(&self, context: &mut LootContext) -> i32 {
        match self {
            NumberProvider::Constant(value)
            | NumberProvider::Object(NormalNumberProvider::Constant(ConstantNumberProvider {
                value,
            })) => value.floor() as i32,
            NumberProvider::Object(provider) => provider.get_int(context),
        }
    }

    pub fn get_float(&self, context: &mut LootContext) -> f32 {
        match self {
            NumberProvider::Constant(value) => *value,
            NumberProvider::Object(provider) => provider.get_float(context),
        }
    }
}

impl NormalNumberProvider {
    pub fn get_int(&self, context: &mut LootContext) -> i32 {
        match self {
            NormalNumberProvider::Constant(constant) => round(constant.value),
            NormalNumberProvider::Uniform(uniform)
            | NormalNumberProvider::UntypedUniform(uniform) => uniform.get_int(context),
            NormalNumberProvider::Binomial(binomial) => binomial.get_int(context),
            NormalNumberProvider::EnchantmentLevel { amount } => {
                round(amount.calculate(context.enchantment_level))
            }
            NormalNumberProvider::Score
            | NormalNumberProvider::Storage
            | NormalNumberProvider::Unknown(_) => 0,
        }
    }

    pub fn get_float(&self, context: &mut LootContext) -> f32 {
        match self {
            NormalNumberProvider::Constant(constant) => constant.value,
            NormalNumberProvider::Uniform(uniform)
            | NormalNumberProvider::UntypedUniform(uniform) => uniform.get_float(context),
            NormalNumberProvider::Binomial(binomial) => binomial.get_int(context) as f32,
            NormalNumberProvider::EnchantmentLevel { amount } => {
                amount.calculate(context.enchantment_level)
            }
            NormalNumberProvider::Score
            | NormalNumberProvider::Storage
            | NormalNumberProvider::Unknown(_) => 0.0,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ConstantNumberProvider {
    pub value: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct UniformNumberProvider {
    pub min: Box<NumberProvider>,
    pub max: Box<NumberProvider>,
}

impl UniformNumberProvider {
    /// An inverted or empty range returns `min` without drawing.
    pub fn get_int(&self, context: &mut LootContext) -> i32 {
        let min = self.min.get_int(context);
        let max = self.max.get_int(context);
        if min >= max {
            return min;
        }
        context.next_bounded_i32(max.wrapping_sub(min).wrapping_add(1)) + min
    }

    pub fn get_float(&self, context: &mut LootContext) -> f32 {
        let min = self.min.get_float(context);
        let max = self.max.get_float(context);
        if min >= max {
            return min;
        }
        context.next_f32() * (max - min) + min
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct BinomialNumberProvider {
    pub n: Box<NumberProvider>,
    pub p: Box<NumberProvider>,
}

impl BinomialNumberProvider {
    /// One draw per trial.
    pub fn get_int(&self, context: &mut LootContext) -> i32 {
        let n = self.n.get_int(context);
        let p = self.p.get_float(context);
        let mut successes = 0;
        for _ in 0..n {
            if context.next_f32() < p {
                successes += 1;
            }
        }
        successes
    }
}

/// `Math.round(float)`: half rounds up, NaN becomes `0`, out of range saturates.
fn round(value: f32) -> i32 {
    (f64::from(value) + 0.5).floor() as i32
}

/// Integer interval used by `limit_count` and `time_check`.
///
/// Either an exact value or optional `min`/`max` bounds that are themselves number providers.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum IntRange {
    Exact(i32),
    Bounds {
        #[serde(default)]
        min: Option<NumberProvider>,
        #[serde(default)]
        max: Option<NumberProvider>,
    },
}

impl IntRange {
    /// `max` is only evaluated once `min` passed.
    pub fn test(&self, value: i32, context: &mut LootContext) -> bool {
        match self {
            IntRange::Exact(exact) => value == *exact,
            IntRange::Bounds { min, max } => {
                if let Some(min) = min {
                    if min.get_int(context) > value {
                        return false;
                    }
                }
                max.as_ref()
                    .is_none_or(|max| value <= max.get_int(context))
            }
        }
    }

    pub fn clamp(&self, value: i32, context: &mut LootContext) -> i32 {
        match self {
            IntRange::Exact(exact) => *exact,
            IntRange::Bounds { min, max } => {
                let mut value = value;
                if let Some(min) = min {
                    value = value.max(min.get_int(context));
                }
                if let Some(max) = max {
                    value = value.min(max.get_int(context));
                }
                value
            }
        }
    }
}

/// A value that scales with an enchantment level, as used by
/// `random_chance_with_enchanted_bonus`.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum LevelBasedValue {
    Constant(f32),
    Object(NormalLevelBasedValue),
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type")]
pub enum NormalLevelBasedValue {
    #[serde(rename = "minecraft:linear", alias = "linear")]
    Linear {
        base: f32,
        per_level_above_first: f32,
    },
    #[serde(rename = "minecraft:levels_squared", alias = "levels_squared")]
    LevelsSquared { added: f32 },
    #[serde(rename = "minecraft:clamped", alias = "clamped")]
    Clamped {
        value: Box<LevelBasedValue>,
        min: f32,
        max: f32,
    },
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

impl LevelBasedValue {
    pub fn calculate(&self, level: i32) -> f32 {
        match self {
            LevelBasedValue::Constant(value) => *value,
            LevelBasedValue::Object(NormalLevelBasedValue::Linear {
                base,
                per_level_above_first,
            }) => base + per_level_above_first * (level - 1) as f32,
            LevelBasedValue::Object(NormalLevelBasedValue::LevelsSquared { added }) => {
                level.saturating_mul(level) as f32 + added
            }
            LevelBasedValue::Object(NormalLevelBasedValue::Clamped { value, min, max }) => {
                let value = value.calculate(level);
                if value < *min {
                    *min
                } else {
                    value.min(*max)
                }
            }
            LevelBasedValue::Object(NormalLevelBasedValue::Unknown(_)) => 0.0,
        }
    }
}
