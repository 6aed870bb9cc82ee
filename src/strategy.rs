//! Persisted strategy configuration and the implementation registry
//!
//! Course authors describe their navigation setup as a list of strategy
//! documents. Each document names the implementation it targets through the
//! `implementingClass` discriminator and carries an opaque JSON blob only that
//! implementation knows how to parse. The registry here is a closed lookup
//! table over the known implementations; there is no dynamic code loading.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One author-facing navigation strategy document
///
/// Read-only from the pipeline's perspective. A course may carry zero, one, or
/// many of these; documents naming an unknown `implementingClass` are skipped
/// with a warning at assembly time, never treated as fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNavigationStrategyData {
    /// Document-store key
    #[serde(rename = "_id")]
    pub id: String,

    /// Author-facing display name
    pub name: String,

    /// Author-facing description
    pub description: String,

    /// Discriminator naming the generator/filter implementation to build
    pub implementing_class: String,

    /// Course this document belongs to
    pub course: String,

    /// Opaque JSON blob, parsed only by the implementation it targets
    pub serialized_data: String,
}

impl ContentNavigationStrategyData {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        implementing_class: impl Into<String>,
        course: impl Into<String>,
        serialized_data: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            implementing_class: implementing_class.into(),
            course: course.into(),
            serialized_data: serialized_data.into(),
        }
    }
}

/// The closed set of strategy implementations this crate knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    EloGenerator,
    SrsGenerator,
    HardcodedOrderGenerator,
    EloDistanceFilter,
    HierarchyDefinitionFilter,
    InterferenceMitigatorFilter,
    RelativePriorityFilter,
    WeightedFilter,
}

impl StrategyKind {
    /// Whether this kind produces candidates (as opposed to re-scoring them)
    pub fn is_generator(&self) -> bool {
        matches!(
            self,
            StrategyKind::EloGenerator
                | StrategyKind::SrsGenerator
                | StrategyKind::HardcodedOrderGenerator
        )
    }

    /// Resolve a document's `implementingClass` discriminator
    pub fn from_class(class: &str) -> Option<StrategyKind> {
        REGISTRY.get(class).copied()
    }

    /// The discriminator string documents use to select this kind
    pub fn class_name(&self) -> &'static str {
        match self {
            StrategyKind::EloGenerator => "EloGenerator",
            StrategyKind::SrsGenerator => "SrsGenerator",
            StrategyKind::HardcodedOrderGenerator => "HardcodedOrderGenerator",
            StrategyKind::EloDistanceFilter => "EloDistanceFilter",
            StrategyKind::HierarchyDefinitionFilter => "HierarchyDefinitionFilter",
            StrategyKind::InterferenceMitigatorFilter => "InterferenceMitigatorFilter",
            StrategyKind::RelativePriorityFilter => "RelativePriorityFilter",
            StrategyKind::WeightedFilter => "WeightedFilter",
        }
    }
}

/// Discriminator-to-kind lookup table, resolved once
static REGISTRY: Lazy<HashMap<&'static str, StrategyKind>> = Lazy::new(|| {
    let kinds = [
        StrategyKind::EloGenerator,
        StrategyKind::SrsGenerator,
        StrategyKind::HardcodedOrderGenerator,
        StrategyKind::EloDistanceFilter,
        StrategyKind::HierarchyDefinitionFilter,
        StrategyKind::InterferenceMitigatorFilter,
        StrategyKind::RelativePriorityFilter,
        StrategyKind::WeightedFilter,
    ];

    kinds.iter().map(|k| (k.class_name(), *k)).collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_every_class_name() {
        for class in [
            "EloGenerator",
            "SrsGenerator",
            "HardcodedOrderGenerator",
            "EloDistanceFilter",
            "HierarchyDefinitionFilter",
            "InterferenceMitigatorFilter",
            "RelativePriorityFilter",
            "WeightedFilter",
        ] {
            let kind = StrategyKind::from_class(class);
            assert!(kind.is_some(), "registry missing {}", class);
            assert_eq!(kind.unwrap().class_name(), class);
        }
    }

    #[test]
    fn test_unknown_class_is_none() {
        assert!(StrategyKind::from_class("TelepathyGenerator").is_none());
        assert!(StrategyKind::from_class("").is_none());
    }

    #[test]
    fn test_generator_filter_partition() {
        assert!(StrategyKind::EloGenerator.is_generator());
        assert!(StrategyKind::SrsGenerator.is_generator());
        assert!(StrategyKind::HardcodedOrderGenerator.is_generator());
        assert!(!StrategyKind::EloDistanceFilter.is_generator());
        assert!(!StrategyKind::WeightedFilter.is_generator());
    }

    #[test]
    fn test_document_wire_format() {
        let json = r#"{
            "_id": "strat-1",
            "name": "Skill matching",
            "description": "",
            "implementingClass": "EloGenerator",
            "course": "course-a",
            "serializedData": "{}"
        }"#;

        let doc: ContentNavigationStrategyData = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "strat-1");
        assert_eq!(doc.implementing_class, "EloGenerator");

        let back = serde_json::to_string(&doc).unwrap();
        assert!(back.contains("\"_id\""));
        assert!(back.contains("\"implementingClass\""));
    }
}
