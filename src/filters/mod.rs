//! Candidate filters
//!
//! A filter re-scores an existing candidate list; it never adds or removes
//! entries. Gating happens through score-zeroing or strong penalty
//! multipliers so the provenance trail stays complete and ordering logic
//! stays centralized in the pipeline. Collaborator failures inside a filter
//! are absorbed with a warning and neutral behavior - a transient data error
//! must never starve a study session - which is why `transform` is
//! infallible.

pub mod elo_distance;
pub mod hierarchy;
pub mod interference;
pub mod priority;
pub mod weighted;

pub use elo_distance::{EloDistanceConfig, EloDistanceFilter};
pub use hierarchy::{HierarchyConfig, HierarchyDefinitionFilter};
pub use interference::{InterferenceConfig, InterferenceMitigatorFilter};
pub use priority::{CombineMode, PriorityConfig, RelativePriorityFilter};
pub use weighted::WeightedFilter;

use crate::store::{CourseStore, UserStore};
use crate::types::WeightedCard;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only bundle handed to every filter call
///
/// Filters perform no side-effecting writes through these handles.
#[derive(Clone)]
pub struct FilterContext {
    pub course: Arc<dyn CourseStore>,
    pub user: Arc<dyn UserStore>,

    /// The user's current global skill rating for this course
    pub user_elo: f32,
}

/// A strategy that re-scores an existing candidate set
#[async_trait]
pub trait CardFilter: Send + Sync {
    /// Machine id, used as the `strategy` field of provenance entries
    fn id(&self) -> &str;

    /// Author-facing name, used as the `strategyName` of provenance entries
    fn display_name(&self) -> &str;

    /// Re-score the candidate list
    ///
    /// Same cardinality in and out. Each card the filter touches gets exactly
    /// one new provenance entry (the weight decorator rewrites its inner
    /// filter's entry instead of appending a second one).
    async fn transform(&self, cards: Vec<WeightedCard>, ctx: &FilterContext) -> Vec<WeightedCard>;
}
