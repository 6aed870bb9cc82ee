//! Weight decorator
//!
//! Wraps another filter and exponentiates its multiplicative effect: where
//! the inner filter changed a card's score by factor `M`, the decorator
//! applies `M^W` instead. This is the hook for a learnable-weight layer above
//! the filters; the crate only provides the contract. Vetoes (an inner output
//! of zero) are absolute and pass through unscaled at any weight.

use super::{CardFilter, FilterContext};
use crate::types::{StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_weight() -> f32 {
    1.0
}

/// The inner strategy a weighted document wraps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerStrategy {
    pub implementing_class: String,

    #[serde(default)]
    pub serialized_data: String,
}

/// Author-supplied decorator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeightedConfig {
    /// Exponent applied to the inner filter's multiplicative effect
    pub weight: f32,

    /// The wrapped filter; a missing or unknown inner degrades the decorator
    /// to a provenance-stamping passthrough
    pub inner: Option<InnerStrategy>,
}

impl Default for WeightedConfig {
    fn default() -> Self {
        Self {
            weight: default_weight(),
            inner: None,
        }
    }
}

/// Exponentiates another filter's effect by a configured weight
pub struct WeightedFilter {
    strategy_id: String,
    name: String,
    weight: f32,
    inner: Option<Arc<dyn CardFilter>>,
}

impl WeightedFilter {
    pub fn new(
        strategy_id: impl Into<String>,
        name: impl Into<String>,
        weight: f32,
        inner: Option<Arc<dyn CardFilter>>,
    ) -> Self {
        let weight = if weight.is_finite() && weight >= 0.0 {
            weight
        } else {
            default_weight()
        };

        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
            weight,
            inner,
        }
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }
}

#[async_trait]
impl CardFilter for WeightedFilter {
    fn id(&self) -> &str {
        "weighted-filter"
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn transform(
        &self,
        mut cards: Vec<WeightedCard>,
        ctx: &FilterContext,
    ) -> Vec<WeightedCard> {
        let Some(inner) = &self.inner else {
            // Degraded decorator: stamp and pass through
            for card in &mut cards {
                let mut entry = StrategyContribution::new(
                    self.id(),
                    &self.name,
                    &self.strategy_id,
                    StrategyAction::Passed,
                    card.score,
                    "no inner filter configured",
                );
                entry.effective_weight = Some(self.weight);
                card.record(entry);
            }
            return cards;
        };

        // W=1 is the identity: hand the inner filter's output back untouched
        if self.weight == 1.0 {
            return inner.transform(cards, ctx).await;
        }

        let before: Vec<f32> = cards.iter().map(|c| c.score).collect();
        let mut cards = inner.transform(cards, ctx).await;

        for (card, old_score) in cards.iter_mut().zip(before) {
            let new_score = card.score;

            // Vetoes and already-dead cards are not subject to dampening
            let scaled = if old_score == 0.0 || new_score == 0.0 {
                new_score
            } else {
                let effect = new_score / old_score;
                old_score * effect.powf(self.weight)
            };

            card.score = scaled;
            // Rewrite the entry the inner filter just appended rather than
            // appending a second one
            if let Some(entry) = card.last_contribution_mut() {
                entry.score = scaled;
                entry.effective_weight = Some(self.weight);
            }
        }

        cards
    }
}
