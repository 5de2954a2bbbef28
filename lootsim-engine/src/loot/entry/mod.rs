use composite::CompositeEntry;
use item::{ItemEntry, LootTableEntry, TagEntry};
use lootsim_util::random::{RandomImpl, legacy_rand::LegacyRand};
use serde::Deserialize;

use crate::item::ItemStack;

use super::{
    condition::{LootCondition, test_conditions},
    context::LootContext,
    function::{LootFunction, apply_functions},
};

mod composite;
mod item;

pub use item::LootTableReference;

#[derive(Deserialize, Clone, Debug)]
pub struct LootPoolEntry {
    #[serde(flatten)]
    pub content: LootPoolEntryTypes,
    #[serde(default)]
    pub conditions: Vec<LootCondition>,
    #[serde(default)]
    pub functions: Vec<LootFunction>,
    #[serde(default = "default_weight")]
    pub weight: i32,
    #[serde(default)]
    pub quality: i32,
}

fn default_weight() -> i32 {
    1
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type")]
pub enum LootPoolEntryTypes {
    #[serde(rename = "minecraft:empty", alias = "empty")]
    /// Takes part in selection but drops nothing
    Empty,
    #[serde(rename = "minecraft:item", alias = "item")]
    Item(ItemEntry),
    #[serde(rename = "minecraft:tag", alias = "tag")]
    Tag(TagEntry),
    #[serde(rename = "minecraft:loot_table", alias = "loot_table")]
    LootTable(LootTableEntry),
    #[serde(rename = "minecraft:dynamic", alias = "dynamic")]
    /// Block entity contents, which never exist here
    Dynamic,
    #[serde(rename = "minecraft:group", alias = "group")]
    Group(CompositeEntry),
    #[serde(rename = "minecraft:alternatives", alias = "alternatives")]
    Alternatives(CompositeEntry),
    #[serde(rename = "minecraft:sequence", alias = "sequence")]
    Sequence(CompositeEntry),
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

/// Something a roll can pick.
#[derive(Clone, Debug)]
pub enum LootCandidate<'e> {
    Entry(&'e LootPoolEntry),
    /// One member of an expanded tag. It has the default weight and no functions.
    TagMember(String),
}

impl LootCandidate<'_> {
    pub fn weight(&self, luck: f32) -> i32 {
        match self {
            LootCandidate::Entry(entry) => entry.effective_weight(luck),
            LootCandidate::TagMember(_) => 1,
        }
    }

    pub fn create_items<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        match self {
            LootCandidate::Entry(entry) => entry.create_items(context, sink),
            LootCandidate::TagMember(id) => sink(ItemStack::new(1, id.as_str()), context),
        }
    }
}

/// Candidates collected for a single roll, in emission order.
#[derive(Default)]
pub struct LootCandidates<'e> {
    candidates: Vec<(LootCandidate<'e>, i32)>,
    total_weight: i32,
}

impl<'e> LootCandidates<'e> {
    /// Keeps the candidate only when its weight under `luck` is positive.
    pub fn push(&mut self, candidate: LootCandidate<'e>, luck: f32) {
        let weight = candidate.weight(luck);
        if weight > 0 {
            self.total_weight = self.total_weight.saturating_add(weight);
            self.candidates.push((candidate, weight));
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn total_weight(&self) -> i32 {
        self.total_weight
    }

    /// Weighted pick. A lone candidate is returned without touching `random`.
    pub fn select(&self, random: &mut LegacyRand) -> Option<&LootCandidate<'e>> {
        if self.total_weight == 0 {
            return None;
        }
        match self.candidates.as_slice() {
            [] => None,
            [(only, _)] => Some(only),
            candidates => {
                let mut remaining = random.next_bounded_i32(self.total_weight);
                for (candidate, weight) in candidates {
                    remaining -= weight;
                    if remaining < 0 {
                        return Some(candidate);
                    }
                }
                None
            }
        }
    }
}

impl LootPoolEntry {
    /// `floor(weight + quality * luck)`, never below zero.
    pub fn effective_weight(&self, luck: f32) -> i32 {
        (self.weight as f32 + self.quality as f32 * luck)
            .floor()
            .max(0.0) as i32
    }

    /// Pushes this entry, or what it stands for, into `candidates`.
    ///
    /// Returns whether the entry ran, which is what alternatives and sequences look at.
    pub fn expand<'e>(
        &'e self,
        context: &mut LootContext,
        candidates: &mut LootCandidates<'e>,
    ) -> bool {
        if !test_conditions(&self.conditions, context) {
            return false;
        }
        match &self.content {
            LootPoolEntryTypes::Group(group) => {
                for child in &group.children {
                    child.expand(context, candidates);
                }
                true
            }
            LootPoolEntryTypes::Alternatives(alternatives) => alternatives
                .children
                .iter()
                .any(|child| child.expand(context, candidates)),
            LootPoolEntryTypes::Sequence(sequence) => sequence
                .children
                .iter()
                .all(|child| child.expand(context, candidates)),
            LootPoolEntryTypes::Tag(tag) if tag.expand => {
                for member in context.lookup().item_tag(&tag.name) {
                    candidates.push(LootCandidate::TagMember(member), context.luck);
                }
                true
            }
            _ => {
                candidates.push(LootCandidate::Entry(self), context.luck);
                true
            }
        }
    }

    /// Produces the items of a selected entry, each passed through the entry's functions.
    pub fn create_items<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        let mut decorated = |stack: ItemStack, context: &mut LootContext<'a>| {
            let stack = apply_functions(&self.functions, stack, context);
            sink(stack, context);
        };
        match &self.content {
            LootPoolEntryTypes::Item(item) => item.create_items(context, &mut decorated),
            LootPoolEntryTypes::Tag(tag) => tag.create_items(context, &mut decorated),
            LootPoolEntryTypes::LootTable(table) => table.create_items(context, &mut decorated),
            LootPoolEntryTypes::Empty | LootPoolEntryTypes::Dynamic => {}
            LootPoolEntryTypes::Group(_)
            | LootPoolEntryTypes::Alternatives(_)
            | LootPoolEntryTypes::Sequence(_) => {
                log::debug!("Composite entry selected directly, nothing dropped");
            }
            LootPoolEntryTypes::Unknown(raw) => {
                log::trace!("Unknown loot entry {raw} dropped nothing");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::loot::context::{EmptyLookup, LootContext, LootLookup};
    use crate::loot::{LootTable, condition::LootCondition};

    use super::{LootCandidate, LootCandidates, LootPoolEntry, LootPoolEntryTypes};

    struct Planks;

    impl LootLookup for Planks {
        fn item_tag(&self, tag: &str) -> Vec<String> {
            if tag == "minecraft:planks" {
                ["minecraft:oak_planks", "minecraft:birch_planks", "minecraft:spruce_planks"]
                    .map(String::from)
                    .to_vec()
            } else {
                Vec::new()
            }
        }

        fn loot_table(&self, _id: &str) -> Option<LootTable> {
            None
        }

        fn predicate(&self, _name: &str) -> Vec<LootCondition> {
            Vec::new()
        }
    }

    fn entry(json: &str) -> LootPoolEntry {
        serde_json::from_str(json).unwrap()
    }

    fn collect<'e>(entry: &'e LootPoolEntry, context: &mut LootContext) -> (bool, LootCandidates<'e>) {
        let mut candidates = LootCandidates::default();
        let ran = entry.expand(context, &mut candidates);
        (ran, candidates)
    }

    #[test]
    fn weight_quality_luck() {
        let entry = entry(r#"{"type":"minecraft:item","name":"minecraft:emerald","weight":2,"quality":3}"#);
        assert_eq!(entry.effective_weight(1.0), 5);
        assert_eq!(entry.effective_weight(0.0), 2);

        let unlucky = entry_with_quality(-10);
        assert_eq!(unlucky.effective_weight(1.0), 0);

        let mut context = LootContext::new(0, &EmptyLookup).with_luck(1.0);
        let (ran, candidates) = collect(&unlucky, &mut context);
        assert!(ran);
        assert!(candidates.is_empty());
        assert_eq!(candidates.total_weight(), 0);
    }

    fn entry_with_quality(quality: i32) -> LootPoolEntry {
        entry(&format!(
            r#"{{"type":"item","name":"minecraft:dirt","quality":{quality}}}"#
        ))
    }

    #[test]
    fn defaults() {
        let entry = entry(r#"{"type":"minecraft:item","name":"minecraft:stone"}"#);
        assert_eq!(entry.weight, 1);
        assert_eq!(entry.quality, 0);
        assert!(entry.conditions.is_empty());
        assert!(entry.functions.is_empty());
    }

    #[test]
    fn failed_condition_does_not_run() {
        let entry = entry(
            r#"{"type":"minecraft:item","name":"minecraft:stone","conditions":[{"condition":"minecraft:killed_by_player"}]}"#,
        );
        let mut context = LootContext::new(0, &EmptyLookup);
        let (ran, candidates) = collect(&entry, &mut context);
        assert!(!ran);
        assert!(candidates.is_empty());
    }

    #[test]
    fn group_emits_every_child() {
        let group = entry(
            r#"{"type":"minecraft:group","children":[
                {"type":"minecraft:item","name":"minecraft:a"},
                {"type":"minecraft:item","name":"minecraft:b","conditions":[{"condition":"minecraft:killed_by_player"}]},
                {"type":"minecraft:item","name":"minecraft:c"}
            ]}"#,
        );
        let mut context = LootContext::new(0, &EmptyLookup);
        let (ran, candidates) = collect(&group, &mut context);
        assert!(ran);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn empty_composites() {
        let mut context = LootContext::new(0, &EmptyLookup);
        let alternatives = entry(r#"{"type":"minecraft:alternatives","children":[]}"#);
        assert!(!collect(&alternatives, &mut context).0);
        let sequence = entry(r#"{"type":"minecraft:sequence","children":[]}"#);
        assert!(collect(&sequence, &mut context).0);
        let group = entry(r#"{"type":"minecraft:group","children":[]}"#);
        assert!(collect(&group, &mut context).0);
    }

    #[test]
    fn alternatives_stop_at_first_that_ran() {
        let alternatives = entry(
            r#"{"type":"minecraft:alternatives","children":[
                {"type":"minecraft:item","name":"minecraft:a","conditions":[{"condition":"minecraft:killed_by_player"}]},
                {"type":"minecraft:item","name":"minecraft:b"},
                {"type":"minecraft:item","name":"minecraft:c","conditions":[{"condition":"minecraft:random_chance","chance":0.5}]}
            ]}"#,
        );
        let mut context = LootContext::new(0, &EmptyLookup);
        let (ran, candidates) = collect(&alternatives, &mut context);
        assert!(ran);
        assert_eq!(candidates.len(), 1);
        assert_eq!(context.random.draws(), 0);
    }

    #[test]
    fn sequence_stops_at_first_that_did_not_run() {
        let sequence = entry(
            r#"{"type":"minecraft:sequence","children":[
                {"type":"minecraft:item","name":"minecraft:a"},
                {"type":"minecraft:item","name":"minecraft:b","conditions":[{"condition":"minecraft:random_chance","chance":0.0}]},
                {"type":"minecraft:item","name":"minecraft:c","conditions":[{"condition":"minecraft:random_chance","chance":1.0}]}
            ]}"#,
        );
        let mut context = LootContext::new(0, &EmptyLookup);
        let (ran, candidates) = collect(&sequence, &mut context);
        assert!(!ran);
        // `a` stays a candidate, `c` is never looked at
        assert_eq!(candidates.len(), 1);
        assert_eq!(context.random.draws(), 1);
    }

    #[test]
    fn expanded_tag_members_are_candidates() {
        let tag = entry(
            r#"{"type":"minecraft:tag","name":"minecraft:planks","expand":true,"weight":5}"#,
        );
        let mut context = LootContext::new(0, &Planks);
        let (ran, candidates) = collect(&tag, &mut context);
        assert!(ran);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates.total_weight(), 3);

        let tag = entry(r#"{"type":"minecraft:tag","name":"minecraft:planks","expand":false}"#);
        let (_, candidates) = collect(&tag, &mut context);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn single_candidate_does_not_draw() {
        let stone = entry(r#"{"type":"minecraft:item","name":"minecraft:stone","weight":7}"#);
        let mut context = LootContext::new(0, &EmptyLookup);
        let (_, candidates) = collect(&stone, &mut context);
        assert!(matches!(
            candidates.select(&mut context.random),
            Some(LootCandidate::Entry(_))
        ));
        assert_eq!(context.random.draws(), 0);
    }

    #[test]
    fn selection_walks_cumulative_weights() {
        let group = entry(
            r#"{"type":"minecraft:group","children":[
                {"type":"minecraft:item","name":"minecraft:a","weight":1},
                {"type":"minecraft:item","name":"minecraft:b","weight":3}
            ]}"#,
        );
        let mut context = LootContext::new(0, &EmptyLookup);
        let (_, candidates) = collect(&group, &mut context);
        // nextInt(4) from seed 0 is 2, past `a`
        let Some(LootCandidate::Entry(selected)) = candidates.select(&mut context.random) else {
            panic!("nothing selected");
        };
        let LootPoolEntryTypes::Item(item) = &selected.content else {
            panic!("not an item");
        };
        assert_eq!(item.name, "minecraft:b");
        assert_eq!(context.random.draws(), 1);
    }

    #[test]
    fn unknown_entry_is_a_silent_candidate() {
        let unknown = entry(r#"{"type":"mymod:special","weight":2}"#);
        assert!(matches!(unknown.content, LootPoolEntryTypes::Unknown(_)));
        let mut context = LootContext::new(0, &EmptyLookup);
        let (ran, candidates) = collect(&unknown, &mut context);
        assert!(ran);
        assert_eq!(candidates.total_weight(), 2);

        let mut items = Vec::new();
        unknown.create_items(&mut context, &mut |stack, _| items.push(stack));
        assert!(items.is_empty());
    }
}
