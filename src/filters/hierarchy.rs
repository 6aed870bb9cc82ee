//! Prerequisite-hierarchy filter
//!
//! Course authors declare, per tag, the tags a learner should master first.
//! Cards carrying a tag with unmet prerequisites are strongly penalized
//! rather than excluded, so they can still surface when nothing else is
//! available. Data-layer failures fail open: a card is only ever locked on
//! positive evidence of an unmet prerequisite.

use super::{CardFilter, FilterContext};
use crate::strategy::ContentNavigationStrategyData;
use crate::types::{CourseElo, StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Score multiplier applied to locked cards
const LOCK_PENALTY: f32 = 0.01;

fn default_min_count() -> u32 {
    3
}

/// One prerequisite a tag depends on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prerequisite {
    /// The tag that must be mastered first
    pub tag: String,

    /// Interactions required before the tag can count as mastered
    #[serde(default = "default_min_count")]
    pub min_count: u32,

    /// Explicit rating threshold; absent means "tag rating at or above the
    /// user's global rating"
    #[serde(default)]
    pub min_elo: Option<f32>,
}

/// Author-supplied prerequisite map: tag name to its prerequisites
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HierarchyConfig {
    pub tags: HashMap<String, Vec<Prerequisite>>,
}

/// Penalizes cards whose tags have unmastered prerequisites
pub struct HierarchyDefinitionFilter {
    strategy_id: String,
    name: String,
    config: HierarchyConfig,
}

impl HierarchyDefinitionFilter {
    pub fn new(
        strategy_id: impl Into<String>,
        name: impl Into<String>,
        config: HierarchyConfig,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
            config,
        }
    }

    /// Build from a persisted strategy document
    ///
    /// A malformed blob degrades to an empty prerequisite map, which locks
    /// nothing.
    pub fn from_document(doc: &ContentNavigationStrategyData) -> Self {
        let config = serde_json::from_str(&doc.serialized_data).unwrap_or_else(|e| {
            warn!(
                strategy = %doc.id,
                error = %e,
                "malformed hierarchy config, using empty prerequisite map"
            );
            HierarchyConfig::default()
        });

        Self::new(&doc.id, &doc.name, config)
    }

    /// Whether one prerequisite is satisfied by the user's rating state
    fn prerequisite_met(prereq: &Prerequisite, elo: &CourseElo) -> bool {
        let Some(tag_elo) = elo.tag(&prereq.tag) else {
            // Zero interactions on the prerequisite tag
            return false;
        };

        if tag_elo.count < prereq.min_count {
            return false;
        }

        match prereq.min_elo {
            Some(threshold) => tag_elo.score >= threshold,
            None => tag_elo.score >= elo.global.score,
        }
    }

    /// The first unmet prerequisite among a card's tags, if any
    fn find_lock(&self, tags: &[String], elo: &CourseElo) -> Option<(String, String)> {
        for tag in tags {
            let Some(prereqs) = self.config.tags.get(tag) else {
                continue;
            };
            for prereq in prereqs {
                if !Self::prerequisite_met(prereq, elo) {
                    return Some((tag.clone(), prereq.tag.clone()));
                }
            }
        }
        None
    }
}

#[async_trait]
impl CardFilter for HierarchyDefinitionFilter {
    fn id(&self) -> &str {
        "hierarchy-filter"
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

        // One registration fetch per call; failure unlocks everything
        let elo = match ctx.user.course_registration(&course_id).await {
            Ok(reg) => Some(reg.elo),
            Err(e) => {
                warn!(error = %e, "registration lookup failed, hierarchy filter failing open");
                None
            }
        };

        for card in &mut cards {
            let lock = elo
                .as_ref()
                .and_then(|elo| self.find_lock(card.tag_slice(), elo));

            let (action, reason) = match lock {
                Some((tag, prereq)) => {
                    card.score *= LOCK_PENALTY;
                    (
                        StrategyAction::Penalized,
                        format!("tag '{}' locked behind unmastered '{}'", tag, prereq),
                    )
                }
                None => (
                    StrategyAction::Passed,
                    "prerequisites satisfied".to_string(),
                ),
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
