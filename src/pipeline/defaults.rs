//! Canonical fallback configuration
//!
//! Used when a course carries no navigation strategies of its own, or when
//! assembly cannot produce a generator: a skill-matching and a
//! spaced-repetition generator merged with the default aggregation, plus one
//! distance-decay filter.

use crate::error::Result;
use crate::filters::{CardFilter, EloDistanceFilter};
use crate::generators::{
    AggregationMode, CardGenerator, CompositeGenerator, EloGenerator, SrsGenerator,
};
use crate::pipeline::Pipeline;
use crate::store::{CourseStore, UserStore};
use std::sync::Arc;

/// The canonical default generator: ELO + SRS composite
pub fn default_generator() -> Result<Arc<dyn CardGenerator>> {
    let composite = CompositeGenerator::new(
        vec![
            Arc::new(EloGenerator::default()),
            Arc::new(SrsGenerator::default()),
        ],
        AggregationMode::default(),
    )?;

    Ok(Arc::new(composite))
}

/// The canonical default filter chain: one distance-decay filter
pub fn default_filters() -> Vec<Arc<dyn CardFilter>> {
    vec![Arc::new(EloDistanceFilter::default())]
}

/// A complete fallback pipeline over the given stores
pub fn default_pipeline(
    course: Arc<dyn CourseStore>,
    user: Arc<dyn UserStore>,
) -> Result<Pipeline> {
    Ok(Pipeline::new(
        default_generator()?,
        default_filters(),
        course,
        user,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryCourseStore, MemoryUserStore};
    use crate::types::{CourseElo, CourseRegistration, PendingReview, ReviewId};
    use chrono::{Duration, Utc};

    #[test]
    fn test_default_generator_constructs() {
        assert!(default_generator().is_ok());
        assert_eq!(default_filters().len(), 1);
    }

    #[tokio::test]
    async fn test_default_pipeline_serves_new_and_review_cards() {
        let course = MemoryCourseStore::new("course-a")
            .with_card("fresh", 1000.0, &[])
            .with_card("seen", 1020.0, &[]);
        let user = MemoryUserStore::new()
            .with_registration(CourseRegistration {
                course_id: "course-a".into(),
                elo: CourseElo::default(),
            })
            .with_review(PendingReview {
                review_id: ReviewId::from("r-1"),
                card_id: "seen".into(),
                course_id: "course-a".into(),
                due: Utc::now() - Duration::days(2),
                interval_days: 1.0,
            });

        let pipeline = default_pipeline(Arc::new(course), Arc::new(user)).unwrap();
        let cards = pipeline.weighted_cards(10).await.unwrap();

        assert_eq!(cards.len(), 2);
        assert!(cards.iter().any(|c| c.review_id.is_some()));
    }
}
