//! Data-access interfaces consumed by the navigation pipeline
//!
//! The pipeline performs no I/O of its own: everything it knows about a course
//! or a user arrives through these two traits. Implementations are expected to
//! be read-mostly; the only mutating operation is strategy authoring.

pub mod memory;

use crate::error::Result;
use crate::strategy::ContentNavigationStrategyData;
use crate::types::{
    CardId, CourseConfig, CourseId, CourseRegistration, PendingReview,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Parameters for a skill-centered content query
#[derive(Debug, Clone, Copy)]
pub struct EloQuery {
    /// Rating to center the result window on
    pub elo: f32,

    /// Maximum number of card ids to return
    pub limit: usize,
}

/// Course-side data access
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Identifier of the course this store serves
    fn course_id(&self) -> CourseId;

    /// Card ids nearest the requested rating, excluding the given ids
    async fn cards_centered_at_elo(
        &self,
        query: EloQuery,
        exclude: &[CardId],
    ) -> Result<Vec<CardId>>;

    /// Current ratings for a batch of cards
    ///
    /// Cards without rating data are absent from the result map rather than
    /// reported as errors.
    async fn card_elo_data(&self, ids: &[CardId]) -> Result<HashMap<CardId, f32>>;

    /// Tags applied to one card
    async fn applied_tags(&self, id: &CardId) -> Result<Vec<String>>;

    /// Course-level settings
    async fn course_config(&self) -> Result<CourseConfig>;

    /// All persisted navigation strategy documents for this course
    async fn navigation_strategies(&self) -> Result<Vec<ContentNavigationStrategyData>>;

    /// One strategy document by id
    async fn navigation_strategy(&self, id: &str) -> Result<ContentNavigationStrategyData>;

    /// Persist a new strategy document
    async fn add_navigation_strategy(&self, data: ContentNavigationStrategyData) -> Result<()>;
}

/// User-side data access
#[async_trait]
pub trait UserStore: Send + Sync {
    /// The user's registration document for a course, including per-tag ELO
    async fn course_registration(&self, course_id: &CourseId) -> Result<CourseRegistration>;

    /// Reviews the scheduler has queued, optionally restricted to one course
    async fn pending_reviews(&self, course_id: Option<&CourseId>) -> Result<Vec<PendingReview>>;

    /// Cards currently in the user's active rotation
    async fn active_cards(&self) -> Result<Vec<CardId>>;
}
