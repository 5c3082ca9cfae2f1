//! Turning populated annotations into one normalized, pruned report.

mod aggregator;
mod frequency;

pub use aggregator::{collect_sections, finalize, ENTITY_LABELS};
pub use frequency::{most_common, pairs_value, TOP_K};
