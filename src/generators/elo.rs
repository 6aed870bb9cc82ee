//! Skill-matching generator
//!
//! Scores candidates by how close their rating sits to the user's. Candidates
//! are the union of new cards fetched around the user's rating and the user's
//! pending scheduled reviews. Reviews are scored with the same distance
//! formula as new cards; pushing due reviews at full strength is the SRS
//! generator's job, so skill matching stays uniform here.

use super::{sort_descending, CardGenerator, GeneratorContext};
use crate::error::Result;
use crate::types::{CardSource, StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use tracing::debug;

/// Rating distance at which a candidate's score reaches zero
const SCORE_RANGE: f32 = 500.0;

/// Generates candidates matched to the user's current skill rating
pub struct EloGenerator {
    strategy_id: String,
    name: String,
}

impl Default for EloGenerator {
    fn default() -> Self {
        Self {
            strategy_id: "default".to_string(),
            name: "Skill matching".to_string(),
        }
    }
}

impl EloGenerator {
    pub fn new(strategy_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
        }
    }

    /// `max(0, 1 - |cardElo - userElo| / 500)`
    fn distance_score(card_elo: f32, user_elo: f32) -> f32 {
        (1.0 - (card_elo - user_elo).abs() / SCORE_RANGE).max(0.0)
    }
}

#[async_trait]
impl CardGenerator for EloGenerator {
    fn id(&self) -> &str {
        "elo-generator"
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn weighted_cards(
        &self,
        limit: usize,
        ctx: &GeneratorContext,
    ) -> Result<Vec<WeightedCard>> {
        let course_id = ctx.course.course_id();

        let reviews = ctx.user.pending_reviews(Some(&course_id)).await?;
        let active = ctx.user.active_cards().await?;

        // New cards must not duplicate anything already in rotation or
        // already queued as a review
        let mut exclude = active;
        exclude.extend(reviews.iter().map(|r| r.card_id.clone()));

        let new_ids = ctx
            .course
            .cards_centered_at_elo(
                crate::store::EloQuery {
                    elo: ctx.user_elo,
                    limit,
                },
                &exclude,
            )
            .await?;

        // One batched rating lookup for the whole candidate union
        let mut all_ids = new_ids.clone();
        all_ids.extend(reviews.iter().map(|r| r.card_id.clone()));
        let elos = ctx.course.card_elo_data(&all_ids).await?;

        let mut cards = Vec::with_capacity(all_ids.len());

        for id in new_ids {
            // Missing rating data is treated as a perfect match rather than
            // dropping the candidate
            let card_elo = elos.get(&id).copied().unwrap_or(ctx.user_elo);
            let score = Self::distance_score(card_elo, ctx.user_elo);

            let mut card = WeightedCard::new(id, course_id.clone(), score);
            card.source = Some(CardSource::New);
            card.elo = Some(card_elo);
            card.record(StrategyContribution::new(
                self.id(),
                &self.name,
                &self.strategy_id,
                StrategyAction::Generated,
                score,
                format!(
                    "card rating {:.0} vs user rating {:.0}",
                    card_elo, ctx.user_elo
                ),
            ));
            cards.push(card);
        }

        for review in reviews {
            let card_elo = elos.get(&review.card_id).copied().unwrap_or(ctx.user_elo);
            let score = Self::distance_score(card_elo, ctx.user_elo);

            let mut card = WeightedCard::new(review.card_id, course_id.clone(), score);
            card.source = Some(CardSource::Review);
            card.elo = Some(card_elo);
            card.review_id = Some(review.review_id);
            card.record(StrategyContribution::new(
                self.id(),
                &self.name,
                &self.strategy_id,
                StrategyAction::Generated,
                score,
                format!(
                    "scheduled review, card rating {:.0} vs user rating {:.0}",
                    card_elo, ctx.user_elo
                ),
            ));
            cards.push(card);
        }

        sort_descending(&mut cards);
        cards.truncate(limit);

        debug!(
            candidates = cards.len(),
            user_elo = ctx.user_elo,
            "skill-matching generator produced candidates"
        );

        Ok(cards)
    }
}
