pub mod random;

use serde::{Deserialize, Serialize};

/// World weather as seen by `weather_check` conditions.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Thunder,
}

impl Weather {
    /// Thunderstorms count as rain, like the game does.
    pub fn is_raining(self) -> bool {
        matches!(self, Self::Rain | Self::Thunder)
    }

    pub fn is_thundering(self) -> bool {
        self == Self::Thunder
    }
}

/// Which item data shape loot functions write.
///
/// Minecraft 1.20.5 replaced free-form item NBT with typed item components. Tables written for
/// either side of that change use different functions to attach item data.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataVersion {
    /// Before 1.20.5: `set_nbt`.
    Legacy,
    /// 1.20.5 and later: `set_components`, function `sequence`.
    #[default]
    Modern,
}

impl DataVersion {
    pub fn uses_components(self) -> bool {
        self == Self::Modern
    }
}

#[macro_export]
macro_rules! assert_eq_delta {
    ($x:expr, $y:expr, $d:expr) => {
        if 2f64 * ($x - $y).abs() > $d * ($x.abs() + $y.abs()) {
            panic!("{} vs {} ({} vs {})", $x, $y, ($x - $y).abs(), $d);
        }
    };
}
