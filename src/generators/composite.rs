//! Composite generator
//!
//! Fans a request out to several child generators concurrently and merges
//! their candidate sets by card id. The default aggregation rewards cards
//! that independent strategies agree on, without requiring explicit
//! per-strategy weighting.

use super::{sort_descending, CardGenerator, GeneratorContext};
use crate::error::{AnamnesisError, Result};
use crate::types::{StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Per-occurrence bonus applied by `FrequencyBoost`
const FREQUENCY_BONUS: f32 = 0.1;

/// How scores for a card seen by several children are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Keep the highest score any child produced
    Max,

    /// Arithmetic mean of every score seen
    Average,

    /// Mean boosted by agreement: `avg * (1 + 0.1 * (occurrences - 1))`,
    /// clamped to `1.0`. Cards seen by only one child are never boosted.
    #[default]
    FrequencyBoost,
}

/// Merges the outputs of several child generators into one ranked set
pub struct CompositeGenerator {
    children: Vec<Arc<dyn CardGenerator>>,
    mode: AggregationMode,
    strategy_id: String,
    name: String,
}

impl CompositeGenerator {
    /// Build a composite over the given children
    ///
    /// Zero children is a configuration error: it would silently produce an
    /// empty pipeline, so it fails at construction rather than at first call.
    pub fn new(
        children: Vec<Arc<dyn CardGenerator>>,
        mode: AggregationMode,
    ) -> Result<Self> {
        if children.is_empty() {
            return Err(AnamnesisError::InvalidStrategyConfig(
                "composite generator requires at least one child".to_string(),
            ));
        }

        Ok(Self {
            children,
            mode,
            strategy_id: "composite".to_string(),
            name: "Composite".to_string(),
        })
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    fn aggregate(&self, scores: &[f32]) -> f32 {
        match self.mode {
            AggregationMode::Max => scores.iter().copied().fold(0.0, f32::max),
            AggregationMode::Average => {
                scores.iter().sum::<f32>() / scores.len() as f32
            }
            AggregationMode::FrequencyBoost => {
                let average = scores.iter().sum::<f32>() / scores.len() as f32;
                let boosted =
                    average * (1.0 + FREQUENCY_BONUS * (scores.len() as f32 - 1.0));
                boosted.min(1.0)
            }
        }
    }
}

#[async_trait]
impl CardGenerator for CompositeGenerator {
    fn id(&self) -> &str {
        "composite-generator"
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn weighted_cards(
        &self,
        limit: usize,
        ctx: &GeneratorContext,
    ) -> Result<Vec<WeightedCard>> {
        let results = join_all(
            self.children
                .iter()
                .map(|child| child.weighted_cards(limit, ctx)),
        )
        .await;

        // A failing child degrades the merge; only all-fail propagates
        let mut batches = Vec::with_capacity(results.len());
        let mut last_error = None;
        for (child, result) in self.children.iter().zip(results) {
            match result {
                Ok(cards) => batches.push(cards),
                Err(e) => {
                    warn!(
                        generator = child.id(),
                        error = %e,
                        "child generator failed, continuing with the rest"
                    );
                    last_error = Some(e);
                }
            }
        }
        if batches.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        // Merge by card id, keeping the first-seen card (and its Generated
        // provenance entry) as the representative
        let mut order = Vec::new();
        let mut merged: HashMap<crate::types::CardId, (WeightedCard, Vec<f32>)> =
            HashMap::new();

        for batch in batches {
            for card in batch {
                match merged.get_mut(&card.card_id) {
                    Some((_, scores)) => scores.push(card.score),
                    None => {
                        order.push(card.card_id.clone());
                        let score = card.score;
                        merged.insert(card.card_id.clone(), (card, vec![score]));
                    }
                }
            }
        }

        let mut cards = Vec::with_capacity(order.len());
        for id in order {
            let (mut card, scores) = merged
                .remove(&id)
                .ok_or_else(|| AnamnesisError::Other("merge map desync".to_string()))?;

            let occurrences = scores.len();
            let final_score = self.aggregate(&scores);
            let action = if final_score > card.score {
                StrategyAction::Boosted
            } else {
                StrategyAction::Passed
            };

            card.score = final_score;
            card.record(StrategyContribution::new(
                self.id(),
                &self.name,
                &self.strategy_id,
                action,
                final_score,
                format!(
                    "merged {} occurrence(s) across {} generator(s)",
                    occurrences,
                    self.children.len()
                ),
            ));
            cards.push(card);
        }

        sort_descending(&mut cards);
        cards.truncate(limit);

        Ok(cards)
    }
}
