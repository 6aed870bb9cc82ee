//! Fixed-order generator
//!
//! Serves cards in an author-curated sequence. Earlier positions score
//! higher, with a floor of `0.5` so late-course content is never starved
//! outright. Cards with a pending review jump the queue at full weight.

use super::{sort_descending, CardGenerator, GeneratorContext};
use crate::error::Result;
use crate::strategy::ContentNavigationStrategyData;
use crate::types::{CardSource, StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Author-supplied configuration: the ordered card-id list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HardcodedOrderConfig {
    pub card_ids: Vec<String>,
}

/// Generates candidates in an author-fixed order
pub struct HardcodedOrderGenerator {
    strategy_id: String,
    name: String,
    config: HardcodedOrderConfig,
}

impl HardcodedOrderGenerator {
    pub fn new(
        strategy_id: impl Into<String>,
        name: impl Into<String>,
        config: HardcodedOrderConfig,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
            config,
        }
    }

    /// Build from a persisted strategy document
    ///
    /// A malformed blob degrades to an empty order (the generator then yields
    /// nothing) rather than failing assembly.
    pub fn from_document(doc: &ContentNavigationStrategyData) -> Self {
        let config = serde_json::from_str(&doc.serialized_data).unwrap_or_else(|e| {
            warn!(
                strategy = %doc.id,
                error = %e,
                "malformed hardcoded-order config, using empty order"
            );
            HardcodedOrderConfig::default()
        });

        Self::new(&doc.id, &doc.name, config)
    }

    /// 1-indexed positional score: `max(0.5, 1.0 - (position/total) * 0.5)`
    fn positional_score(position: usize, total: usize) -> f32 {
        (1.0 - (position as f32 / total as f32) * 0.5).max(0.5)
    }
}

#[async_trait]
impl CardGenerator for HardcodedOrderGenerator {
    fn id(&self) -> &str {
        "hardcoded-order-generator"
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn weighted_cards(
        &self,
        limit: usize,
        ctx: &GeneratorContext,
    ) -> Result<Vec<WeightedCard>> {
        if self.config.card_ids.is_empty() {
            return Ok(Vec::new());
        }

        let course_id = ctx.course.course_id();
        let reviews: HashMap<_, _> = ctx
            .user
            .pending_reviews(Some(&course_id))
            .await?
            .into_iter()
            .map(|r| (r.card_id.clone(), r.review_id))
            .collect();

        let total = self.config.card_ids.len();
        let mut cards = Vec::with_capacity(total);

        for (index, id) in self.config.card_ids.iter().enumerate() {
            let card_id = crate::types::CardId::from(id.as_str());
            let position = index + 1;

            let (score, source, review_id, reason) = match reviews.get(&card_id) {
                Some(review_id) => (
                    1.0,
                    CardSource::Review,
                    Some(review_id.clone()),
                    "scheduled review jumps the fixed order".to_string(),
                ),
                None => (
                    Self::positional_score(position, total),
                    CardSource::New,
                    None,
                    format!("position {} of {}", position, total),
                ),
            };

            let mut card = WeightedCard::new(card_id, course_id.clone(), score);
            card.source = Some(source);
            card.review_id = review_id;
            card.record(StrategyContribution::new(
                self.id(),
                &self.name,
                &self.strategy_id,
                StrategyAction::Generated,
                score,
                reason,
            ));
            cards.push(card);
        }

        // Reviews score 1.0, so the stable sort puts them ahead while new
        // cards keep their authored order
        sort_descending(&mut cards);
        cards.truncate(limit);

        Ok(cards)
    }
}
