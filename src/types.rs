//! Core data types for the anamnesis navigation engine
//!
//! This module defines the fundamental data structures used throughout the
//! crate: card identifiers, skill-rating snapshots, scheduled reviews, and the
//! scored candidate (`WeightedCard`) that flows through every pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rating assigned to users and cards that have no interaction history yet
pub const DEFAULT_ELO: f32 = 1000.0;

/// Opaque identifier of a piece of course content
///
/// Wraps the document-store key to prevent mixing card ids with other
/// string-based identifiers in the system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a course
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub String);

impl CourseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CourseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a scheduled review, set only on cards that originate from one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

impl From<&str> for ReviewId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a candidate card came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSource {
    /// Content the user has never seen
    New,

    /// A scheduled review that has (or is about to) come due
    Review,

    /// Content the user failed recently and should revisit
    Failed,
}

/// The effect one pipeline stage had on a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyAction {
    /// The stage introduced the card into the candidate set
    Generated,

    /// The stage inspected the card and left its score unchanged
    Passed,

    /// The stage raised the card's score
    Boosted,

    /// The stage lowered the card's score
    Penalized,
}

/// One pipeline stage's contribution to a card's final score
///
/// Contributions form an append-only audit trail. Later stages never read
/// earlier entries for scoring, with one exception: the weight decorator
/// rewrites the entry its inner filter just appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyContribution {
    /// Machine id of the strategy implementation (registry key)
    pub strategy: String,

    /// Author-facing strategy name
    pub strategy_name: String,

    /// Id of the strategy document this stage was built from
    pub strategy_id: String,

    /// What the stage did to the card
    pub action: StrategyAction,

    /// The card's score immediately after this stage
    pub score: f32,

    /// Human-readable explanation of the adjustment
    pub reason: String,

    /// Exponent applied by the weight decorator, when one wrapped this stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_weight: Option<f32>,
}

impl StrategyContribution {
    pub fn new(
        strategy: impl Into<String>,
        strategy_name: impl Into<String>,
        strategy_id: impl Into<String>,
        action: StrategyAction,
        score: f32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            strategy_name: strategy_name.into(),
            strategy_id: strategy_id.into(),
            action,
            score,
            reason: reason.into(),
            effective_weight: None,
        }
    }
}

/// A scored candidate card moving through the pipeline
///
/// Scores conventionally live in `[0, 1]`; intermediate stages may exceed the
/// band but final pipeline output is clamped non-negative. Tags are hydrated
/// once by the pipeline before any filter runs, so filters never perform their
/// own tag lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedCard {
    /// Content identifier
    pub card_id: CardId,

    /// Course the card belongs to
    pub course_id: CourseId,

    /// Current score
    pub score: f32,

    /// Provenance of origin, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CardSource>,

    /// Tags applied to the card, hydrated by the pipeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Skill-rating snapshot of the card, when a stage resolved one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elo: Option<f32>,

    /// Set only when the card originates from a scheduled review
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<ReviewId>,

    /// Ordered audit trail of every stage that touched this card
    pub provenance: Vec<StrategyContribution>,
}

impl WeightedCard {
    /// Create a bare card with no provenance
    ///
    /// Generators must record a `Generated` contribution before returning the
    /// card; a card with empty provenance never leaves a generator.
    pub fn new(card_id: impl Into<CardId>, course_id: impl Into<CourseId>, score: f32) -> Self {
        Self {
            card_id: card_id.into(),
            course_id: course_id.into(),
            score,
            source: None,
            tags: None,
            elo: None,
            review_id: None,
            provenance: Vec::new(),
        }
    }

    /// Append a contribution to the audit trail
    pub fn record(&mut self, contribution: StrategyContribution) {
        self.provenance.push(contribution);
    }

    /// The most recent audit entry, if any
    pub fn last_contribution(&self) -> Option<&StrategyContribution> {
        self.provenance.last()
    }

    /// Mutable access to the most recent audit entry
    ///
    /// Used by the weight decorator, which rewrites the entry its inner filter
    /// just appended rather than appending a second one.
    pub fn last_contribution_mut(&mut self) -> Option<&mut StrategyContribution> {
        self.provenance.last_mut()
    }

    /// Tags as a slice, empty when hydration has not happened yet
    pub fn tag_slice(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

/// A skill rating together with the interaction count that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloScore {
    /// Current rating
    pub score: f32,

    /// Number of graded interactions behind the rating
    pub count: u32,
}

impl Default for EloScore {
    fn default() -> Self {
        Self {
            score: DEFAULT_ELO,
            count: 0,
        }
    }
}

/// A user's per-course skill rating, including the per-tag breakdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseElo {
    /// Rating across the whole course
    pub global: EloScore,

    /// Rating per tag the user has interacted with
    pub tags: HashMap<String, EloScore>,
}

impl CourseElo {
    /// Look up the user's rating for one tag, if any interactions exist
    pub fn tag(&self, name: &str) -> Option<&EloScore> {
        self.tags.get(name)
    }
}

/// The user's registration document for one course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRegistration {
    pub course_id: CourseId,
    pub elo: CourseElo,
}

/// A review the scheduler has queued for the user
///
/// `interval_days` is the interval the scheduler computed when it queued this
/// review; the SRS generator maps it into a due-ness score without re-deriving
/// any scheduling math.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReview {
    pub review_id: ReviewId,
    pub card_id: CardId,
    pub course_id: CourseId,

    /// When the review comes due
    pub due: DateTime<Utc>,

    /// Interval between the last interaction and `due`, in days
    pub interval_days: f32,
}

/// Course-level settings relevant to navigation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseConfig {
    pub name: String,
    pub description: String,
}
