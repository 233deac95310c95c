//! Label timeline reconstruction.
//!
//! The tracker reports label changes as a stream of events:
//!
//! - `labeled` - a label was attached at a point in time
//! - `unlabeled` - a label was removed at a point in time
//!
//! Replaying that stream up to an instant yields the workflow labels that
//! were active when a given comment was posted. Only labels on the workflow
//! allow-list are tracked.

mod replay;
mod types;

pub use replay::{active_labels_at, sorted_events};
pub use types::{LabelEvent, LabelEventKind};
