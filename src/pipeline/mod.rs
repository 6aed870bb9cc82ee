//! The navigation pipeline
//!
//! One generator (possibly composite) followed by an ordered filter chain.
//! The pipeline owns tag hydration, the final sort, and truncation; it holds
//! no state between calls.

pub mod assembler;
pub mod defaults;

pub use assembler::{AssembledPipeline, PipelineAssembler};

use crate::error::Result;
use crate::filters::{CardFilter, FilterContext};
use crate::generators::{CardGenerator, GeneratorContext};
use crate::store::{CourseStore, UserStore};
use crate::types::{WeightedCard, DEFAULT_ELO};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How far past the requested limit the generator is asked to reach, so the
/// filter chain (which only re-weights, never adds) leaves enough surviving
/// mass after penalties
const OVERFETCH_FACTOR: usize = 3;

/// A ready-to-run candidate ranking pipeline
///
/// Ephemeral: constructed per study-session request, stateless between calls
/// to [`weighted_cards`](Pipeline::weighted_cards).
pub struct Pipeline {
    generator: Arc<dyn CardGenerator>,
    filters: Vec<Arc<dyn CardFilter>>,
    course: Arc<dyn CourseStore>,
    user: Arc<dyn UserStore>,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn CardGenerator>,
        filters: Vec<Arc<dyn CardFilter>>,
        course: Arc<dyn CourseStore>,
        user: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            generator,
            filters,
            course,
            user,
        }
    }

    pub fn generator(&self) -> &Arc<dyn CardGenerator> {
        &self.generator
    }

    pub fn filters(&self) -> &[Arc<dyn CardFilter>] {
        &self.filters
    }

    /// Produce up to `limit` candidates, ranked by final score
    ///
    /// Always returns a list; an empty one means there is nothing to study.
    pub async fn weighted_cards(&self, limit: usize) -> Result<Vec<WeightedCard>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let course_id = self.course.course_id();

        // Resolve the user's rating once and share it with every stage
        let user_elo = match self.user.course_registration(&course_id).await {
            Ok(reg) => reg.elo.global.score,
            Err(e) => {
                warn!(error = %e, "registration lookup failed, using the default rating");
                DEFAULT_ELO
            }
        };

        let generator_ctx = GeneratorContext {
            course: Arc::clone(&self.course),
            user: Arc::clone(&self.user),
            user_elo,
        };

        let mut cards = self
            .generator
            .weighted_cards(limit * OVERFETCH_FACTOR, &generator_ctx)
            .await?;

        if cards.is_empty() {
            return Ok(Vec::new());
        }

        self.hydrate_tags(&mut cards).await;

        // Filters run strictly in order: each one's multiplicative effect is
        // defined relative to the score the previous one left behind
        let filter_ctx = FilterContext {
            course: Arc::clone(&self.course),
            user: Arc::clone(&self.user),
            user_elo,
        };
        for filter in &self.filters {
            cards = filter.transform(cards, &filter_ctx).await;
            debug!(filter = filter.id(), candidates = cards.len(), "filter applied");
        }

        // Stable sort keeps generator order on ties, so identical input
        // state yields identical output
        cards.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for card in &mut cards {
            card.score = card.score.max(0.0);
        }
        cards.truncate(limit);

        info!(
            course = %course_id,
            returned = cards.len(),
            filters = self.filters.len(),
            "pipeline produced ranked candidates"
        );

        Ok(cards)
    }

    /// Fetch tags for every candidate once, concurrently
    ///
    /// Filters rely on this and never re-fetch tags themselves. A failed
    /// lookup leaves the card with an empty tag list.
    async fn hydrate_tags(&self, cards: &mut [WeightedCard]) {
        let lookups = join_all(
            cards
                .iter()
                .map(|card| self.course.applied_tags(&card.card_id)),
        )
        .await;

        for (card, tags) in cards.iter_mut().zip(lookups) {
            card.tags = Some(match tags {
                Ok(tags) => tags,
                Err(e) => {
                    warn!(card = %card.card_id, error = %e, "tag hydration failed");
                    Vec::new()
                }
            });
        }
    }
}
