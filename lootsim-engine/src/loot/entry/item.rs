use serde::Deserialize;

use crate::{
    item::ItemStack,
    loot::{LootTable, context::LootContext},
};

#[derive(Deserialize, Clone, Debug)]
pub struct ItemEntry {
    pub name: String,
}

impl ItemEntry {
    pub fn create_items<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        sink(ItemStack::new(1, self.name.as_str()), context);
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TagEntry {
    pub name: String,
    /// Whether each member becomes its own candidate instead of dropping all members at once.
    #[serde(default)]
    pub expand: bool,
}

impl TagEntry {
    /// The unexpanded form: one item per tag member.
    pub fn create_items<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        for member in context.lookup().item_tag(&self.name) {
            sink(ItemStack::new(1, member), context);
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct LootTableEntry {
    /// Older data names the table with `name`.
    #[serde(alias = "name")]
    pub value: LootTableReference,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum LootTableReference {
    Id(String),
    Inline(Box<LootTable>),
}

impl LootTableEntry {
    pub fn create_items<'a>(
        &self,
        context: &mut LootContext<'a>,
        sink: &mut dyn FnMut(ItemStack, &mut LootContext<'a>),
    ) {
        match &self.value {
            LootTableReference::Id(id) => match context.lookup().loot_table(id) {
                Some(table) => table.generate_into(context, sink),
                None => log::debug!("Loot table {id} not found, nothing dropped"),
            },
            LootTableReference::Inline(table) => table.generate_into(context, sink),
        }
    }
}
