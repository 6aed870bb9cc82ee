//! In-memory store implementations
//!
//! HashMap-backed stores used by the integration tests, documentation
//! examples, and benches. These are the only store implementations the crate
//! ships; production deployments implement the traits over their own
//! document store.

use super::{CourseStore, EloQuery, UserStore};
use crate::error::{AnamnesisError, Result};
use crate::strategy::ContentNavigationStrategyData;
use crate::types::{
    CardId, CourseConfig, CourseId, CourseRegistration, PendingReview,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct CardRecord {
    elo: f32,
    tags: Vec<String>,
}

/// In-memory course store
///
/// Built fluently:
///
/// ```
/// use anamnesis::store::memory::MemoryCourseStore;
///
/// let store = MemoryCourseStore::new("course-a")
///     .with_card("c1", 1000.0, &["verbs"])
///     .with_card("c2", 1250.0, &["nouns"]);
/// ```
pub struct MemoryCourseStore {
    course_id: CourseId,
    config: CourseConfig,
    cards: HashMap<CardId, CardRecord>,
    strategies: RwLock<Vec<ContentNavigationStrategyData>>,
}

impl MemoryCourseStore {
    pub fn new(course_id: impl Into<CourseId>) -> Self {
        Self {
            course_id: course_id.into(),
            config: CourseConfig::default(),
            cards: HashMap::new(),
            strategies: RwLock::new(Vec::new()),
        }
    }

    pub fn with_config(mut self, config: CourseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_card(mut self, id: impl Into<CardId>, elo: f32, tags: &[&str]) -> Self {
        self.cards.insert(
            id.into(),
            CardRecord {
                elo,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_strategy(self, strategy: ContentNavigationStrategyData) -> Self {
        self.strategies
            .write()
            .expect("strategy lock poisoned")
            .push(strategy);
        self
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    fn course_id(&self) -> CourseId {
        self.course_id.clone()
    }

    async fn cards_centered_at_elo(
        &self,
        query: EloQuery,
        exclude: &[CardId],
    ) -> Result<Vec<CardId>> {
        let mut candidates: Vec<(&CardId, f32)> = self
            .cards
            .iter()
            .filter(|(id, _)| !exclude.contains(id))
            .map(|(id, record)| (id, (record.elo - query.elo).abs()))
            .collect();

        // Distance first, then id, so identical inputs always return the
        // same window
        candidates.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.as_str().cmp(b.0.as_str()))
        });

        Ok(candidates
            .into_iter()
            .take(query.limit)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn card_elo_data(&self, ids: &[CardId]) -> Result<HashMap<CardId, f32>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.cards.get(id).map(|record| (id.clone(), record.elo)))
            .collect())
    }

    async fn applied_tags(&self, id: &CardId) -> Result<Vec<String>> {
        Ok(self
            .cards
            .get(id)
            .map(|record| record.tags.clone())
            .unwrap_or_default())
    }

    async fn course_config(&self) -> Result<CourseConfig> {
        Ok(self.config.clone())
    }

    async fn navigation_strategies(&self) -> Result<Vec<ContentNavigationStrategyData>> {
        Ok(self
            .strategies
            .read()
            .expect("strategy lock poisoned")
            .clone())
    }

    async fn navigation_strategy(&self, id: &str) -> Result<ContentNavigationStrategyData> {
        self.strategies
            .read()
            .expect("strategy lock poisoned")
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AnamnesisError::StrategyNotFound(id.to_string()))
    }

    async fn add_navigation_strategy(&self, data: ContentNavigationStrategyData) -> Result<()> {
        self.strategies
            .write()
            .expect("strategy lock poisoned")
            .push(data);
        Ok(())
    }
}

/// In-memory user store
#[derive(Default)]
pub struct MemoryUserStore {
    registrations: HashMap<CourseId, CourseRegistration>,
    reviews: Vec<PendingReview>,
    active: Vec<CardId>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registration(mut self, registration: CourseRegistration) -> Self {
        self.registrations
            .insert(registration.course_id.clone(), registration);
        self
    }

    pub fn with_review(mut self, review: PendingReview) -> Self {
        self.reviews.push(review);
        self
    }

    pub fn with_active_card(mut self, id: impl Into<CardId>) -> Self {
        self.active.push(id.into());
        self
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn course_registration(&self, course_id: &CourseId) -> Result<CourseRegistration> {
        self.registrations
            .get(course_id)
            .cloned()
            .ok_or_else(|| AnamnesisError::Store(format!("no registration for {}", course_id)))
    }

    async fn pending_reviews(&self, course_id: Option<&CourseId>) -> Result<Vec<PendingReview>> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| course_id.map_or(true, |c| &r.course_id == c))
            .cloned()
            .collect())
    }

    async fn active_cards(&self) -> Result<Vec<CardId>> {
        Ok(self.active.clone())
    }
}
