use serde::Deserialize;

use super::{
    context::LootContext,
    number::{IntRange, NumberProvider},
};

mod enchantment;

pub use enchantment::{EnchantedBonusChance, LootingChance, TableBonus};

/// A predicate gating pools, entries and functions.
///
/// The simulation has no world, so predicates about entities, blocks, tools, damage sources,
/// locations, scores and values cannot be evaluated. They always fail, except
/// `survives_explosion` which always passes because nothing explodes. Unknown conditions fail.
#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "condition")]
pub enum LootCondition {
    #[serde(rename = "minecraft:inverted", alias = "inverted")]
    Inverted { term: Box<LootCondition> },
    #[serde(
        rename = "minecraft:any_of",
        alias = "any_of",
        alias = "minecraft:alternative",
        alias = "alternative"
    )]
    AnyOf { terms: Vec<LootCondition> },
    #[serde(rename = "minecraft:all_of", alias = "all_of")]
    AllOf { terms: Vec<LootCondition> },
    #[serde(rename = "minecraft:random_chance", alias = "random_chance")]
    RandomChance { chance: NumberProvider },
    #[serde(
        rename = "minecraft:random_chance_with_looting",
        alias = "random_chance_with_looting"
    )]
    RandomChanceWithLooting(LootingChance),
    #[serde(
        rename = "minecraft:random_chance_with_enchanted_bonus",
        alias = "random_chance_with_enchanted_bonus"
    )]
    RandomChanceWithEnchantedBonus(EnchantedBonusChance),
    #[serde(rename = "minecraft:table_bonus", alias = "table_bonus")]
    TableBonus(TableBonus),
    #[serde(rename = "minecraft:time_check", alias = "time_check")]
    TimeCheck {
        value: IntRange,
        #[serde(default)]
        period: Option<i64>,
    },
    #[serde(rename = "minecraft:weather_check", alias = "weather_check")]
    WeatherCheck {
        #[serde(default)]
        raining: Option<bool>,
        #[serde(default)]
        thundering: Option<bool>,
    },
    #[serde(rename = "minecraft:reference", alias = "reference")]
    Reference { name: String },
    #[serde(rename = "minecraft:survives_explosion", alias = "survives_explosion")]
    SurvivesExplosion,
    #[serde(rename = "minecraft:killed_by_player", alias = "killed_by_player")]
    KilledByPlayer,
    #[serde(rename = "minecraft:entity_properties", alias = "entity_properties")]
    EntityProperties,
    #[serde(rename = "minecraft:entity_scores", alias = "entity_scores")]
    EntityScores,
    #[serde(rename = "minecraft:block_state_property", alias = "block_state_property")]
    BlockStateProperty,
    #[serde(rename = "minecraft:match_tool", alias = "match_tool")]
    MatchTool,
    #[serde(
        rename = "minecraft:damage_source_properties",
        alias = "damage_source_properties"
    )]
    DamageSourceProperties,
    #[serde(rename = "minecraft:location_check", alias = "location_check")]
    LocationCheck,
    #[serde(rename = "minecraft:value_check", alias = "value_check")]
    ValueCheck,
    #[serde(
        rename = "minecraft:enchantment_active_check",
        alias = "enchantment_active_check"
    )]
    EnchantmentActiveCheck,
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

impl LootCondition {
    pub fn test(&self, context: &mut LootContext) -> bool {
        match self {
            LootCondition::Inverted { term } => !term.test(context),
            LootCondition::AnyOf { terms } => terms.iter().any(|term| term.test(context)),
            LootCondition::AllOf { terms } => test_conditions(terms, context),
            LootCondition::RandomChance { chance } => {
                let chance = chance.get_float(context);
                context.next_f32() < chance
            }
            LootCondition::RandomChanceWithLooting(chance) => chance.test(context),
            LootCondition::RandomChanceWithEnchantedBonus(chance) => chance.test(context),
            LootCondition::TableBonus(bonus) => bonus.test(context),
            LootCondition::TimeCheck { value, period } => {
                let mut time = context.day_time;
                if let Some(period) = period {
                    time = time.checked_rem(*period).unwrap_or(time);
                }
                value.test(time as i32, context)
            }
            LootCondition::WeatherCheck {
                raining,
                thundering,
            } => {
                raining.is_none_or(|raining| raining == context.weather.is_raining())
                    && thundering
                        .is_none_or(|thundering| thundering == context.weather.is_thundering())
            }
            LootCondition::Reference { name } => {
                let predicate = context.lookup().predicate(name);
                test_conditions(&predicate, context)
            }
            LootCondition::SurvivesExplosion => true,
            LootCondition::KilledByPlayer
            | LootCondition::EntityProperties
            | LootCondition::EntityScores
            | LootCondition::BlockStateProperty
            | LootCondition::MatchTool
            | LootCondition::DamageSourceProperties
            | LootCondition::LocationCheck
            | LootCondition::ValueCheck
            | LootCondition::EnchantmentActiveCheck => false,
            LootCondition::Unknown(raw) => {
                log::trace!("Unknown loot condition {raw} fails");
                false
            }
        }
    }
}

/// Conditions of a pool, entry or function: all must pass, evaluated left to right until the
/// first failure.
pub fn test_conditions(conditions: &[LootCondition], context: &mut LootContext) -> bool {
    conditions.iter().all(|condition| condition.test(context))
}

#[cfg(test)]
mod test {
    use lootsim_util::Weather;

    use crate::loot::{
        LootTable,
        context::{EmptyLookup, LootContext, LootLookup},
    };

    use super::{LootCondition, test_conditions};

    fn condition(json: &str) -> LootCondition {
        serde_json::from_str(json).unwrap()
    }

    struct Predicates;

    impl LootLookup for Predicates {
        fn item_tag(&self, _tag: &str) -> Vec<String> {
            Vec::new()
        }

        fn loot_table(&self, _id: &str) -> Option<LootTable> {
            None
        }

        fn predicate(&self, name: &str) -> Vec<LootCondition> {
            match name {
                "test:rainy" => vec![condition(
                    r#"{"condition":"minecraft:weather_check","raining":true}"#,
                )],
                "test:coin" => vec![condition(
                    r#"{"condition":"minecraft:random_chance","chance":0.5}"#,
                )],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn random_chance_bounds() {
        let mut context = LootContext::new(0, &EmptyLookup);
        assert!(condition(r#"{"condition":"minecraft:random_chance","chance":1.0}"#).test(&mut context));
        assert!(!condition(r#"{"condition":"random_chance","chance":0.0}"#).test(&mut context));
        assert_eq!(context.random.draws(), 2);
    }

    #[test]
    fn random_chance_uses_float_draw() {
        // First float from seed 0 is 0.73096776
        let mut context = LootContext::new(0, &EmptyLookup);
        assert!(condition(r#"{"condition":"random_chance","chance":0.75}"#).test(&mut context));
        let mut context = LootContext::new(0, &EmptyLookup);
        assert!(!condition(r#"{"condition":"random_chance","chance":0.7}"#).test(&mut context));
    }

    #[test]
    fn any_of_short_circuits() {
        let any_of = condition(
            r#"{"condition":"minecraft:any_of","terms":[
                {"condition":"minecraft:survives_explosion"},
                {"condition":"minecraft:random_chance","chance":0.5}
            ]}"#,
        );
        let mut context = LootContext::new(0, &EmptyLookup);
        assert!(any_of.test(&mut context));
        assert_eq!(context.random.draws(), 0);
    }

    #[test]
    fn legacy_alternative_name() {
        let alternative = condition(
            r#"{"condition":"minecraft:alternative","terms":[{"condition":"minecraft:killed_by_player"}]}"#,
        );
        assert!(matches!(alternative, LootCondition::AnyOf { .. }));
        assert!(!alternative.test(&mut LootContext::new(0, &EmptyLookup)));
    }

    #[test]
    fn condition_list_stops_at_first_failure() {
        let conditions: Vec<LootCondition> = serde_json::from_str(
            r#"[
                {"condition":"minecraft:match_tool","predicate":{"items":"minecraft:shears"}},
                {"condition":"minecraft:random_chance","chance":0.5}
            ]"#,
        )
        .unwrap();
        let mut context = LootContext::new(0, &EmptyLookup);
        assert!(!test_conditions(&conditions, &mut context));
        assert_eq!(context.random.draws(), 0);
        assert!(test_conditions(&[], &mut context));
    }

    #[test]
    fn inverted() {
        let mut context = LootContext::new(0, &EmptyLookup);
        let inverted = condition(
            r#"{"condition":"minecraft:inverted","term":{"condition":"minecraft:killed_by_player"}}"#,
        );
        assert!(inverted.test(&mut context));
    }

    #[test]
    fn world_predicates_have_fixed_results() {
        let mut context = LootContext::new(0, &EmptyLookup);
        for name in [
            "killed_by_player",
            "entity_properties",
            "entity_scores",
            "block_state_property",
            "match_tool",
            "damage_source_properties",
            "location_check",
            "value_check",
            "enchantment_active_check",
        ] {
            let json = format!(r#"{{"condition":"minecraft:{name}","extra":{{"x":1}}}}"#);
            assert!(!condition(&json).test(&mut context), "{name}");
        }
        assert!(condition(r#"{"condition":"minecraft:survives_explosion"}"#).test(&mut context));
        assert_eq!(context.random.draws(), 0);
    }

    #[test]
    fn unknown_condition_fails() {
        let unknown = condition(r#"{"condition":"mymod:full_moon"}"#);
        assert!(matches!(unknown, LootCondition::Unknown(_)));
        assert!(!unknown.test(&mut LootContext::new(0, &EmptyLookup)));
    }

    #[test]
    fn time_check_with_period() {
        let night = condition(
            r#"{"condition":"minecraft:time_check","value":{"min":13000,"max":23000},"period":24000}"#,
        );
        let mut context = LootContext::new(0, &EmptyLookup).with_day_time(24000 * 3 + 14000);
        assert!(night.test(&mut context));
        let mut context = LootContext::new(0, &EmptyLookup).with_day_time(24000 * 3 + 6000);
        assert!(!night.test(&mut context));
    }

    #[test]
    fn time_check_exact_and_zero_period() {
        let noon = condition(r#"{"condition":"time_check","value":6000,"period":0}"#);
        let mut context = LootContext::new(0, &EmptyLookup).with_day_time(6000);
        assert!(noon.test(&mut context));
    }

    #[test]
    fn weather_check() {
        let raining = condition(r#"{"condition":"minecraft:weather_check","raining":true}"#);
        let thundering =
            condition(r#"{"condition":"minecraft:weather_check","raining":true,"thundering":true}"#);
        let clear = condition(r#"{"condition":"minecraft:weather_check","raining":false}"#);

        let mut context = LootContext::new(0, &EmptyLookup).with_weather(Weather::Thunder);
        assert!(raining.test(&mut context));
        assert!(thundering.test(&mut context));
        assert!(!clear.test(&mut context));

        let mut context = LootContext::new(0, &EmptyLookup).with_weather(Weather::Rain);
        assert!(raining.test(&mut context));
        assert!(!thundering.test(&mut context));

        let mut context = LootContext::new(0, &EmptyLookup);
        assert!(clear.test(&mut context));
    }

    #[test]
    fn reference_goes_through_lookup() {
        let rainy = condition(r#"{"condition":"minecraft:reference","name":"test:rainy"}"#);
        let mut context = LootContext::new(0, &Predicates).with_weather(Weather::Rain);
        assert!(rainy.test(&mut context));
        let mut context = LootContext::new(0, &Predicates);
        assert!(!rainy.test(&mut context));

        let coin = condition(r#"{"condition":"minecraft:reference","name":"test:coin"}"#);
        coin.test(&mut context);
        assert_eq!(context.random.draws(), 1);

        let missing = condition(r#"{"condition":"minecraft:reference","name":"test:missing"}"#);
        assert!(missing.test(&mut context));
    }
}
