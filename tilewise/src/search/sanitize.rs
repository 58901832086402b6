//! Repairs for known upstream catalog defects.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::catalog::ItemCollection;

/// Collections whose items may carry an EPSG code with a dropped zero,
/// e.g. `3266` for UTM zone 6N (`32606`).
pub const MALFORMED_EPSG_COLLECTIONS: &[&str] = &["landsat-c2-l2"];

/// Items whose assets are corrupt upstream and break loading outright.
pub const DENIED_ITEM_IDS: &[&str] = &[
    "LC08_L2SR_081074_20220514_02_T1",
    "LC08_L2SP_101055_20220612_02_T2",
    "LC08_L2SR_074072_20221105_02_T1",
    "LC09_L2SR_074071_20220708_02_T1",
    "LC08_L2SR_078075_20220712_02_T1",
    "LC08_L2SR_080076_20220726_02_T1",
    "LC08_L2SR_082074_20220724_02_T1",
    "LC09_L2SR_083075_20220402_02_T1",
    "LC08_L2SR_083073_20220917_02_T1",
    "LC08_L2SR_089064_20201007_02_T2",
    "S2B_MSIL2A_20230214T001719_R116_T56MMB_20230214T095023",
];

/// Reinserts the zone padding into an EPSG code: the first three digits
/// are kept and the rest is zero-padded to two digits.
fn repair_epsg(code: i64) -> i64 {
    let digits = code.to_string();
    if digits.len() <= 3 || !digits.is_ascii() {
        return code;
    }
    let (prefix, suffix) = digits.split_at(3);
    match suffix.parse::<i64>() {
        Ok(zone) => format!("{}{:02}", prefix, zone).parse().unwrap_or(code),
        Err(_) => code,
    }
}

/// Repairs `proj:epsg` in place for items of the affected collections.
pub fn fix_bad_epsgs(items: &mut ItemCollection) {
    for item in items.items_mut() {
        let affected = item
            .collection
            .as_deref()
            .is_some_and(|c| MALFORMED_EPSG_COLLECTIONS.contains(&c));
        if !affected {
            continue;
        }
        if let Some(code) = item.epsg() {
            let repaired = repair_epsg(code);
            if repaired != code {
                debug!(item = %item.id, from = code, to = repaired, "Repaired EPSG code");
                item.properties
                    .insert("proj:epsg".to_string(), Value::from(repaired));
            }
        }
    }
}

/// Drops items whose id is in `denied`.
pub fn remove_bad_items(items: &mut ItemCollection, denied: &HashSet<String>) {
    let before = items.len();
    items.retain(|item| !denied.contains(&item.id));
    let removed = before - items.len();
    if removed > 0 {
        debug!(removed, "Removed denied items");
    }
}
