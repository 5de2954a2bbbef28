use serde::Deserialize;

use crate::item::ItemStack;

use super::{
    condition::{LootCondition, test_conditions},
    context::LootContext,
    number::{IntRange, NumberProvider},
};

mod bonus;

pub use bonus::LootFunctionBonusParameter;

/// An item modifier with its own gate.
#[derive(Deserialize, Clone, Debug)]
pub struct LootFunction {
    #[serde(flatten)]
    pub content: LootFunctionTypes,
    #[serde(default)]
    pub conditions: Vec<LootCondition>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "function")]
pub enum LootFunctionTypes {
    #[serde(rename = "minecraft:set_count", alias = "set_count")]
    SetCount {
        count: NumberProvider,
        #[serde(default)]
        add: bool,
    },
    #[serde(rename = "minecraft:limit_count", alias = "limit_count")]
    LimitCount { limit: IntRange },
    #[serde(rename = "minecraft:apply_bonus", alias = "apply_bonus")]
    ApplyBonus {
        #[serde(default)]
        enchantment: Option<String>,
        formula: String,
        #[serde(default)]
        parameters: Option<LootFunctionBonusParameter>,
    },
    /// Without an explosion there is nothing to decay.
    #[serde(rename = "minecraft:explosion_decay", alias = "explosion_decay")]
    ExplosionDecay,
    #[serde(rename = "minecraft:set_components", alias = "set_components")]
    SetComponents {
        components: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(rename = "minecraft:set_nbt", alias = "set_nbt")]
    SetNbt { tag: String },
    #[serde(rename = "minecraft:sequence", alias = "sequence")]
    Sequence { functions: Vec<LootFunction> },
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

impl LootFunction {
    /// Returns the item untouched when the function's conditions fail.
    pub fn apply(&self, stack: ItemStack, context: &mut LootContext) -> ItemStack {
        if !test_conditions(&self.conditions, context) {
            return stack;
        }
        self.content.apply(stack, context)
    }
}

impl LootFunctionTypes {
    pub fn apply(&self, mut stack: ItemStack, context: &mut LootContext) -> ItemStack {
        match self {
            LootFunctionTypes::SetCount { count, add } => {
                let count = count.get_int(context);
                stack.item_count = if *add {
                    stack.item_count.saturating_add(count)
                } else {
                    count
                };
            }
            LootFunctionTypes::LimitCount { limit } => {
                stack.item_count = limit.clamp(stack.item_count, context);
            }
            LootFunctionTypes::ApplyBonus {
                enchantment: _,
                formula,
                parameters,
            } => {
                stack.item_count =
                    bonus::apply_bonus(formula, parameters.as_ref(), stack.item_count, context);
            }
            LootFunctionTypes::ExplosionDecay => {}
            LootFunctionTypes::SetComponents { components } => {
                if !context.version.uses_components() {
                    log::trace!("set_components ignored for legacy data");
                    return stack;
                }
                for (key, value) in components {
                    // A leading `!` removes the component.
                    if let Some(removed) = key.strip_prefix('!') {
                        stack.components.remove(removed);
                    } else {
                        stack.components.insert(key.clone(), value.clone());
                    }
                }
            }
            LootFunctionTypes::SetNbt { tag } => {
                if context.version.uses_components() {
                    log::trace!("set_nbt ignored for component data");
                    return stack;
                }
                stack
                    .components
                    .insert("nbt".to_string(), serde_json::Value::String(tag.clone()));
            }
            LootFunctionTypes::Sequence { functions } => {
                if !context.version.uses_components() {
                    log::trace!("function sequence ignored for legacy data");
                    return stack;
                }
                return apply_functions(functions, stack, context);
            }
            LootFunctionTypes::Unknown(raw) => {
                log::trace!("Unknown loot function {raw} ignored");
            }
        }
        stack
    }
}

/// Runs `functions` in order, each one seeing the previous result.
pub fn apply_functions(
    functions: &[LootFunction],
    stack: ItemStack,
    context: &mut LootContext,
) -> ItemStack {
    functions
        .iter()
        .fold(stack, |stack, function| function.apply(stack, context))
}
