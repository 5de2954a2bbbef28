use std::collections::BTreeMap;

use serde::Serialize;

/// One resolved drop.
///
/// `components` holds whatever item data functions attached: item components for modern
/// tables, an `nbt` string for legacy ones. The engine never interprets it.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ItemStack {
    pub id: String,
    #[serde(rename = "count")]
    pub item_count: i32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, serde_json::Value>,
}

impl ItemStack {
    pub fn new(item_count: i32, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_count,
            components: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count <= 0
    }
}
