pub mod item;
pub mod loot;

pub use item::ItemStack;
pub use loot::{
    LootPool, LootTable,
    context::{EmptyLookup, LootContext, LootLookup},
};
