#![no_main]

use libfuzzer_sys::fuzz_target;
use lootsim_engine::{EmptyLookup, LootContext, LootTable};

// Any table that parses must generate without panicking.
fuzz_target!(|data: &[u8]| {
    let Some((seed, json)) = data.split_first_chunk::<8>() else {
        return;
    };
    if let Ok(table) = serde_json::from_slice::<LootTable>(json) {
        let mut context = LootContext::new(u64::from_le_bytes(*seed), &EmptyLookup);
        let _ = table.generate(&mut context);
    }
});
