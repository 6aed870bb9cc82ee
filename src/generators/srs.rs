//! Spaced-repetition generator
//!
//! Surfaces the user's pending scheduled reviews, scored by how overdue each
//! one is. The scheduler has already decided when a review comes due and at
//! what interval; this generator only maps that due-ness into the `[0, 1]`
//! score band.

use super::{sort_descending, CardGenerator, GeneratorContext};
use crate::error::Result;
use crate::types::{CardSource, PendingReview, StrategyAction, StrategyContribution, WeightedCard};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Generates candidates from the user's scheduled review queue
pub struct SrsGenerator {
    strategy_id: String,
    name: String,
}

impl Default for SrsGenerator {
    fn default() -> Self {
        Self {
            strategy_id: "default".to_string(),
            name: "Scheduled reviews".to_string(),
        }
    }
}

impl SrsGenerator {
    pub fn new(strategy_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            name: name.into(),
        }
    }

    /// Map a review's due-ness into the score band
    ///
    /// Due-ness `r` is elapsed time since the last interaction over the
    /// scheduled interval: `r = 0` right after the interaction, `r = 1`
    /// exactly at the due time, `r > 1` once overdue. The score
    /// `1 - 0.5^r` is monotone in `r`, crosses `0.5` at the due time, and
    /// approaches `1.0` for long-overdue reviews.
    fn due_score(review: &PendingReview, now: DateTime<Utc>) -> f32 {
        let interval_secs = (review.interval_days.max(f32::EPSILON) as f64) * 86_400.0;
        let last = review.due - chrono::Duration::seconds(interval_secs as i64);
        let elapsed = (now - last).num_seconds() as f64;
        let r = (elapsed / interval_secs).max(0.0);

        (1.0 - 0.5_f64.powf(r)) as f32
    }
}

#[async_trait]
impl CardGenerator for SrsGenerator {
    fn id(&self) -> &str {
        "srs-generator"
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
        let now = Utc::now();

        let mut cards = Vec::with_capacity(reviews.len());

        for review in reviews {
            let score = Self::due_score(&review, now);

            let mut card = WeightedCard::new(review.card_id, course_id.clone(), score);
            card.source = Some(CardSource::Review);
            card.review_id = Some(review.review_id);
            card.record(StrategyContribution::new(
                self.id(),
                &self.name,
                &self.strategy_id,
                StrategyAction::Generated,
                score,
                format!("review due {}", review.due.format("%Y-%m-%d %H:%M")),
            ));
            cards.push(card);
        }

        sort_descending(&mut cards);
        cards.truncate(limit);

        debug!(reviews = cards.len(), "srs generator produced candidates");

        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryCourseStore, MemoryUserStore};
    use crate::types::{CardId, ReviewId};
    use chrono::Duration;
    use std::sync::Arc;

    fn review(card: &str, due: DateTime<Utc>, interval_days: f32) -> PendingReview {
        PendingReview {
            review_id: ReviewId::from(format!("r-{}", card).as_str()),
            card_id: card.into(),
            course_id: "course-a".into(),
            due,
            interval_days,
        }
    }

    fn context(user: MemoryUserStore) -> GeneratorContext {
        GeneratorContext {
            course: Arc::new(MemoryCourseStore::new("course-a")),
            user: Arc::new(user),
            user_elo: 1000.0,
        }
    }

    #[test]
    fn test_due_score_crosses_half_at_due_time() {
        let now = Utc::now();
        let score = SrsGenerator::due_score(&review("c1", now, 3.0), now);
        assert!((score - 0.5).abs() < 1e-3, "score at due time was {}", score);
    }

    #[test]
    fn test_due_score_monotone_in_overdueness() {
        let now = Utc::now();
        let barely = SrsGenerator::due_score(&review("c1", now - Duration::hours(1), 1.0), now);
        let very = SrsGenerator::due_score(&review("c1", now - Duration::days(10), 1.0), now);

        assert!(barely > 0.5);
        assert!(very > barely);
        assert!(very < 1.0);
    }

    #[test]
    fn test_due_score_low_before_due() {
        let now = Utc::now();
        // Due in 2 days on a 4-day interval: halfway through
        let score = SrsGenerator::due_score(&review("c1", now + Duration::days(2), 4.0), now);
        assert!(score > 0.0 && score < 0.5);
    }

    #[test]
    fn test_due_score_clamped_at_zero_elapsed() {
        let now = Utc::now();
        // Due far in the future relative to its interval
        let score = SrsGenerator::due_score(&review("c1", now + Duration::days(30), 1.0), now);
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_overdue_sorts_ahead() {
        let now = Utc::now();
        let user = MemoryUserStore::new()
            .with_review(review("fresh", now + Duration::days(2), 4.0))
            .with_review(review("overdue", now - Duration::days(5), 1.0));

        let cards = SrsGenerator::default()
            .weighted_cards(10, &context(user))
            .await
            .unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].card_id, CardId::from("overdue"));
        assert_eq!(cards[0].source, Some(CardSource::Review));
        assert!(cards[0].review_id.is_some());
    }

    #[tokio::test]
    async fn test_no_reviews_yields_empty() {
        let cards = SrsGenerator::default()
            .weighted_cards(10, &context(MemoryUserStore::new()))
            .await
            .unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_provenance_stamped() {
        let user = MemoryUserStore::new().with_review(review("c1", Utc::now(), 1.0));

        let cards = SrsGenerator::default()
            .weighted_cards(10, &context(user))
            .await
            .unwrap();

        assert_eq!(cards[0].provenance.len(), 1);
        assert_eq!(cards[0].provenance[0].action, StrategyAction::Generated);
        assert_eq!(cards[0].provenance[0].strategy, "srs-generator");
    }
}
