//! Candidate generators
//!
//! A generator produces the initial scored candidate set for a pipeline run.
//! Every card leaving a generator carries exactly one `Generated` provenance
//! entry and a score conventionally inside `[0, 1]`. Generators never fail on
//! "no candidates" - they return an empty list and let the pipeline surface
//! that to the caller.

pub mod composite;
pub mod elo;
pub mod ordered;
pub mod srs;

pub use composite::{AggregationMode, CompositeGenerator};
pub use elo::EloGenerator;
pub use ordered::HardcodedOrderGenerator;
pub use srs::SrsGenerator;

use crate::error::Result;
use crate::store::{CourseStore, UserStore};
use crate::types::WeightedCard;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only bundle handed to every generator call
///
/// The user's global rating is resolved once per pipeline run and shared, so
/// generators never re-fetch the registration document themselves.
#[derive(Clone)]
pub struct GeneratorContext {
    pub course: Arc<dyn CourseStore>,
    pub user: Arc<dyn UserStore>,

    /// The user's current global skill rating for this course
    pub user_elo: f32,
}

/// A strategy that produces an initial scored candidate set
#[async_trait]
pub trait CardGenerator: Send + Sync {
    /// Machine id, used as the `strategy` field of provenance entries
    fn id(&self) -> &str;

    /// Author-facing name, used as the `strategyName` of provenance entries
    fn display_name(&self) -> &str;

    /// Produce at most `limit` scored candidates
    ///
    /// An empty result is not an error. Each returned card has exactly one
    /// `Generated` provenance entry.
    async fn weighted_cards(
        &self,
        limit: usize,
        ctx: &GeneratorContext,
    ) -> Result<Vec<WeightedCard>>;
}

/// Stable descending sort by score, preserving insertion order on ties
pub(crate) fn sort_descending(cards: &mut [WeightedCard]) {
    cards.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
