//! Interference-mitigation filter
//!
//! Course authors declare sets of tags that are cognitively confusable when
//! learned concurrently (visually or phonetically similar concepts, say).
//! While the user is still immature on one member of a set, cards carrying
//! the other members are penalized so the confusable material arrives after
//! the first concept has settled.

use super::{CardFilter, FilterContext};
use crate::strategy::ContentNavigationStrategyData;
use crate::types::{CourseElo, StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

fn default_min_count() -> u32 {
    10
}

fn default_decay() -> f32 {
    0.8
}

/// Author-supplied interference declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterferenceConfig {
    /// Symmetric sets of mutually confusable tags
    pub sets: Vec<Vec<String>>,

    /// Interactions required before a started tag counts as mature
    pub min_count: u32,

    /// Optional rating bar a tag must also clear to count as mature
    pub min_elo: Option<f32>,

    /// Penalty strength: each avoided tag on a card multiplies its score by
    /// `1 - decay`
    pub decay: f32,
}

impl Default for InterferenceConfig {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            min_count: default_min_count(),
            min_elo: None,
            decay: default_decay(),
        }
    }
}

impl InterferenceConfig {
    fn validated(mut self) -> Self {
        if !self.decay.is_finite() || !(0.0..=1.0).contains(&self.decay) {
            self.decay = default_decay();
        }
        self
    }
}

/// Penalizes cards that would interfere with a concept still being learned
pub struct InterferenceMitigatorFilter {
    strategy_id: String,
    name: String,
    config: InterferenceConfig,
}

impl InterferenceMitigatorFilter {
    pub fn new(
        strategy_id: impl Into<String>,
        name: impl Into<String>,
        config: InterferenceConfig,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
            config: config.validated(),
        }
    }

    /// Build from a persisted strategy document
    ///
    /// A malformed blob degrades to empty interference sets, which penalize
    /// nothing.
    pub fn from_document(doc: &ContentNavigationStrategyData) -> Self {
        let config = serde_json::from_str(&doc.serialized_data).unwrap_or_else(|e| {
            warn!(
                strategy = %doc.id,
                error = %e,
                "malformed interference config, using empty sets"
            );
            InterferenceConfig::default()
        });

        Self::new(&doc.id, &doc.name, config)
    }

    /// A tag is immature when the user has started it but not settled it
    fn is_immature(&self, tag: &str, elo: &CourseElo) -> bool {
        let Some(tag_elo) = elo.tag(tag) else {
            // Never touched: nothing to interfere with yet
            return false;
        };
        if tag_elo.count == 0 {
            return false;
        }

        if tag_elo.count < self.config.min_count {
            return true;
        }
        match self.config.min_elo {
            Some(threshold) => tag_elo.score < threshold,
            None => false,
        }
    }

    /// Tags to keep away from the user right now
    ///
    /// For every immature tag, its partners in each declared set join the
    /// avoid-set unless they are themselves immature (two half-learned
    /// concepts already interfere; suppressing both would deadlock them).
    fn avoid_set(&self, elo: &CourseElo) -> HashSet<String> {
        let mut avoid = HashSet::new();

        for set in &self.config.sets {
            for tag in set {
                if !self.is_immature(tag, elo) {
                    continue;
                }
                for partner in set {
                    if partner != tag && !self.is_immature(partner, elo) {
                        avoid.insert(partner.clone());
                    }
                }
            }
        }

        avoid
    }
}

#[async_trait]
impl CardFilter for InterferenceMitigatorFilter {
    fn id(&self) -> &str {
        "interference-filter"
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn transform(
        &self,
        mut cards: Vec<WeightedCard>,
        ctx: &FilterContext,
    ) -> Vec<WeightedCard> {
        let course_id = ctx.course.course_id();

        let avoid = match ctx.user.course_registration(&course_id).await {
            Ok(reg) => self.avoid_set(&reg.elo),
            Err(e) => {
                warn!(error = %e, "registration lookup failed, interference filter failing open");
                HashSet::new()
            }
        };

        for card in &mut cards {
            let matches = card
                .tag_slice()
                .iter()
                .filter(|t| avoid.contains(*t))
                .count();

            let (action, reason) = if matches == 0 {
                (StrategyAction::Passed, "no interference".to_string())
            } else {
                let penalty = (1.0 - self.config.decay).powi(matches as i32);
                card.score *= penalty;
                (
                    StrategyAction::Penalized,
                    format!("{} tag(s) interfere with immature material", matches),
                )
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
