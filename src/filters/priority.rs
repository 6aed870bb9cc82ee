//! Relative-priority filter
//!
//! Course authors weight tags by importance; cards carrying higher-priority
//! tags are nudged up the ranking and lower-priority ones down. The nudge is
//! deliberately gentle: priority shapes the ordering, it does not gate.

use super::{CardFilter, FilterContext};
use crate::strategy::ContentNavigationStrategyData;
use crate::types::{StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Priority assigned to tags the author did not list
const NEUTRAL_PRIORITY: f32 = 0.5;

fn default_influence() -> f32 {
    0.5
}

/// How a card's tag priorities combine into one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// The card is as important as its most important tag
    #[default]
    Max,

    /// The card is as important as its least important tag
    Min,

    /// Mean priority across the card's tags
    Average,
}

/// Author-supplied priority weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriorityConfig {
    /// Tag name to priority in `[0, 1]`
    pub priorities: HashMap<String, f32>,

    pub combine: CombineMode,

    /// How strongly priority moves the score: boost factor is
    /// `1 + (priority - 0.5) * influence`
    pub influence: f32,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            priorities: HashMap::new(),
            combine: CombineMode::default(),
            influence: default_influence(),
        }
    }
}

impl PriorityConfig {
    fn validated(mut self) -> Self {
        if !self.influence.is_finite() || self.influence < 0.0 {
            self.influence = default_influence();
        }
        for priority in self.priorities.values_mut() {
            if !priority.is_finite() {
                *priority = NEUTRAL_PRIORITY;
            }
            *priority = priority.clamp(0.0, 1.0);
        }
        self
    }
}

/// Boosts or dampens cards by their tags' authored priority
pub struct RelativePriorityFilter {
    strategy_id: String,
    name: String,
    config: PriorityConfig,
}

impl RelativePriorityFilter {
    pub fn new(
        strategy_id: impl Into<String>,
        name: impl Into<String>,
        config: PriorityConfig,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
            config: config.validated(),
        }
    }

    /// Build from a persisted strategy document, neutral on a bad blob
    pub fn from_document(doc: &ContentNavigationStrategyData) -> Self {
        let config = serde_json::from_str(&doc.serialized_data).unwrap_or_else(|e| {
            warn!(
                strategy = %doc.id,
                error = %e,
                "malformed priority config, using neutral priorities"
            );
            PriorityConfig::default()
        });

        Self::new(&doc.id, &doc.name, config)
    }

    fn tag_priority(&self, tag: &str) -> f32 {
        self.config
            .priorities
            .get(tag)
            .copied()
            .unwrap_or(NEUTRAL_PRIORITY)
    }

    /// Combined priority over a card's tags; untagged cards are neutral
    fn card_priority(&self, tags: &[String]) -> f32 {
        if tags.is_empty() {
            return NEUTRAL_PRIORITY;
        }

        let priorities = tags.iter().map(|t| self.tag_priority(t));
        match self.config.combine {
            CombineMode::Max => priorities.fold(0.0, f32::max),
            CombineMode::Min => priorities.fold(1.0, f32::min),
            CombineMode::Average => {
                priorities.sum::<f32>() / tags.len() as f32
            }
        }
    }
}

#[async_trait]
impl CardFilter for RelativePriorityFilter {
    fn id(&self) -> &str {
        "priority-filter"
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn transform(
        &self,
        mut cards: Vec<WeightedCard>,
        _ctx: &FilterContext,
    ) -> Vec<WeightedCard> {
        for card in &mut cards {
            let priority = self.card_priority(card.tag_slice());
            let boost = 1.0 + (priority - NEUTRAL_PRIORITY) * self.config.influence;

            let old_score = card.score;
            card.score = (card.score * boost).clamp(0.0, 1.0);

            let action = if card.score > old_score {
                StrategyAction::Boosted
            } else if card.score < old_score {
                StrategyAction::Penalized
            } else {
                StrategyAction::Passed
            };

            card.record(StrategyContribution::new(
                self.id(),
                &self.name,
                &self.strategy_id,
                action,
                card.score,
                format!("combined tag priority {:.2}", priority),
            ));
        }

        cards
    }
}
