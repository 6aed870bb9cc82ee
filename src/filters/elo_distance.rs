//! Distance-decay filter
//!
//! Applies a smooth multiplicative penalty that grows with the gap between a
//! card's rating and the user's. The curve is exponential, so it is symmetric
//! around the user's rating, monotonically decreasing in distance, and free
//! of discontinuities.

use super::{CardFilter, FilterContext};
use crate::strategy::ContentNavigationStrategyData;
use crate::types::{StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Author-tunable curve parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EloDistanceConfig {
    /// Rating distance over which the penalty decays by `1/e`
    pub half_life: f32,

    /// Multiplier floor approached at large distances
    pub min_multiplier: f32,

    /// Multiplier at zero distance
    pub max_multiplier: f32,
}

impl Default for EloDistanceConfig {
    fn default() -> Self {
        Self {
            half_life: 200.0,
            min_multiplier: 0.3,
            max_multiplier: 1.0,
        }
    }
}

impl EloDistanceConfig {
    /// Clamp out-of-range values back to usable ones
    fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !self.half_life.is_finite() || self.half_life <= 0.0 {
            self.half_life = defaults.half_life;
        }
        if !self.min_multiplier.is_finite() || self.min_multiplier < 0.0 {
            self.min_multiplier = defaults.min_multiplier;
        }
        if !self.max_multiplier.is_finite() || self.max_multiplier < self.min_multiplier {
            self.max_multiplier = defaults.max_multiplier.max(self.min_multiplier);
        }
        self
    }
}

/// Penalizes cards far from the user's skill rating
pub struct EloDistanceFilter {
    strategy_id: String,
    name: String,
    config: EloDistanceConfig,
}

impl Default for EloDistanceFilter {
    fn default() -> Self {
        Self::new("default", "Distance decay", EloDistanceConfig::default())
    }
}

impl EloDistanceFilter {
    pub fn new(
        strategy_id: impl Into<String>,
        name: impl Into<String>,
        config: EloDistanceConfig,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
            config: config.validated(),
        }
    }

    /// Build from a persisted strategy document, defaulting on a bad blob
    pub fn from_document(doc: &ContentNavigationStrategyData) -> Self {
        let config = serde_json::from_str(&doc.serialized_data).unwrap_or_else(|e| {
            warn!(
                strategy = %doc.id,
                error = %e,
                "malformed distance-decay config, using defaults"
            );
            EloDistanceConfig::default()
        });

        Self::new(&doc.id, &doc.name, config)
    }

    /// `min + (max - min) * exp(-distance / halfLife)`
    pub fn multiplier(&self, distance: f32) -> f32 {
        let EloDistanceConfig {
            half_life,
            min_multiplier,
            max_multiplier,
        } = self.config;

        min_multiplier + (max_multiplier - min_multiplier) * (-distance.abs() / half_life).exp()
    }
}

#[async_trait]
impl CardFilter for EloDistanceFilter {
    fn id(&self) -> &str {
        "elo-distance-filter"
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn transform(
        &self,
        mut cards: Vec<WeightedCard>,
        ctx: &FilterContext,
    ) -> Vec<WeightedCard> {
        // One batched lookup for cards the generator left without a snapshot
        let missing: Vec<_> = cards
            .iter()
            .filter(|c| c.elo.is_none())
            .map(|c| c.card_id.clone())
            .collect();

        let fetched = if missing.is_empty() {
            Default::default()
        } else {
            match ctx.course.card_elo_data(&missing).await {
                Ok(map) => map,
                Err(e) => {
                    warn!(error = %e, "rating lookup failed, distance filter failing open");
                    Default::default()
                }
            }
        };

        for card in &mut cards {
            let card_elo = card.elo.or_else(|| fetched.get(&card.card_id).copied());

            let (action, reason) = match card_elo {
                Some(elo) => {
                    let distance = (elo - ctx.user_elo).abs();
                    let multiplier = self.multiplier(distance);
                    card.score *= multiplier;
                    card.elo = Some(elo);

                    let action = if multiplier < 1.0 {
                        StrategyAction::Penalized
                    } else {
                        StrategyAction::Passed
                    };
                    (
                        action,
                        format!("distance {:.0}, multiplier {:.3}", distance, multiplier),
                    )
                }
                // No rating available: no adjustment
                None => (StrategyAction::Passed, "rating unavailable".to_string()),
            };

            card.record(StrategyContribution::new(
                self.id(),
                &self.name,
                &self.strategy_id,
                action,
                card.score,
                reason,
            ));
        }

        cards
    }
}
