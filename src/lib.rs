//! Anamnesis - Composable Content Navigation for Spaced-Repetition Courses
//!
//! A scoring engine that selects and ranks the next piece of learning content
//! to present to a user:
//! - Candidate generation from pluggable strategies (skill matching,
//!   spaced-repetition scheduling, fixed ordering)
//! - An ordered filter chain that re-weights or gates candidates
//!   (prerequisite hierarchies, interference avoidance, tag priority,
//!   distance decay)
//! - Runtime pipeline assembly from persisted, author-edited strategy
//!   configuration
//!
//! # Architecture
//!
//! The crate is organized around one value type and four layers:
//! - **Types**: the scored candidate (`WeightedCard`) and its provenance trail
//! - **Store**: the two data-access traits the pipeline consumes
//! - **Generators**: strategies that produce initial scored candidates
//! - **Filters**: strategies that re-score an existing candidate list
//! - **Pipeline**: orchestration, assembly, and defaults
//!
//! # Example
//!
//! ```
//! use anamnesis::store::memory::{MemoryCourseStore, MemoryUserStore};
//! use anamnesis::{ContentNavigationStrategyData, PipelineAssembler};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> anamnesis::Result<()> {
//! let course = Arc::new(
//!     MemoryCourseStore::new("spanish-101")
//!         .with_card("c1", 1000.0, &["verbs"])
//!         .with_card("c2", 1250.0, &["nouns"]),
//! );
//! let user = Arc::new(MemoryUserStore::new());
//!
//! let docs = vec![
//!     ContentNavigationStrategyData::new(
//!         "s-1", "Skill matching", "EloGenerator", "spanish-101", "{}",
//!     ),
//!     ContentNavigationStrategyData::new(
//!         "s-2", "Distance decay", "EloDistanceFilter", "spanish-101", "{}",
//!     ),
//! ];
//!
//! let assembled = PipelineAssembler::assemble(&docs, course, user)?;
//! let pipeline = assembled.pipeline.expect("strategies were supplied");
//!
//! let ranked = pipeline.weighted_cards(5).await?;
//! assert!(!ranked.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filters;
pub mod generators;
pub mod pipeline;
pub mod store;
pub mod strategy;
pub mod types;

// Re-export commonly used types
pub use error::{AnamnesisError, Result};
pub use filters::{CardFilter, FilterContext};
pub use generators::{AggregationMode, CardGenerator, GeneratorContext};
pub use pipeline::{AssembledPipeline, Pipeline, PipelineAssembler};
pub use store::{CourseStore, EloQuery, UserStore};
pub use strategy::{ContentNavigationStrategyData, StrategyKind};
pub use types::{
    CardId, CardSource, CourseId, CourseRegistration, PendingReview, ReviewId, StrategyAction,
    StrategyContribution, WeightedCard,
};
