//! Seed/live collection merge.

use crate::record::Item;

/// Concatenate seed items and live items: seed first in fixed order, then live
/// items in the order the source delivered them.
///
/// No deduplication happens. A live item sharing an id or a title with a seed
/// item shows up twice.
pub fn merge(seed: &[Item], live: &[Item]) -> Vec<Item> {
    let mut out = Vec::with_capacity(seed.len() + live.len());
    out.extend_from_slice(seed);
    out.extend_from_slice(live);
    out
}
