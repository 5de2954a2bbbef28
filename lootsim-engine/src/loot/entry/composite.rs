use serde::Deserialize;

use super::LootPoolEntry;

/// Children of a group, alternatives or sequence entry.
#[derive(Deserialize, Clone, Debug)]
pub struct CompositeEntry {
    #[serde(default)]
    pub children: Vec<LootPoolEntry>,
}
