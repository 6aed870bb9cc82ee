//! Pipeline assembly from persisted strategy documents
//!
//! Reads a course's strategy documents, classifies each as a generator or a
//! filter through the registry, supplies defaults when a piece is missing,
//! and produces a ready pipeline plus non-fatal diagnostics. Filter order is
//! alphabetical by strategy name: identical strategy sets must assemble into
//! identical pipelines no matter what order the store returned the documents
//! in, because filter order changes the cumulative multiplicative effect.

use super::defaults;
use super::Pipeline;
use crate::error::Result;
use crate::filters::weighted::WeightedConfig;
use crate::filters::{
    CardFilter, EloDistanceFilter, HierarchyDefinitionFilter, InterferenceMitigatorFilter,
    RelativePriorityFilter, WeightedFilter,
};
use crate::generators::{
    AggregationMode, CardGenerator, CompositeGenerator, EloGenerator, HardcodedOrderGenerator,
    SrsGenerator,
};
use crate::store::{CourseStore, UserStore};
use crate::strategy::{ContentNavigationStrategyData, StrategyKind};
use std::sync::Arc;
use tracing::{info, warn};

/// The result of assembling a course's strategy documents
pub struct AssembledPipeline {
    /// `None` when the course has no strategy documents at all; the caller
    /// falls back to its own default
    pub pipeline: Option<Pipeline>,

    /// Documents that assembled into generators
    pub generator_strategies: Vec<ContentNavigationStrategyData>,

    /// Documents that assembled into filters, in applied order
    pub filter_strategies: Vec<ContentNavigationStrategyData>,

    /// Non-fatal diagnostics collected along the way
    pub warnings: Vec<String>,
}

/// Builds pipelines from persisted strategy configuration
pub struct PipelineAssembler;

impl PipelineAssembler {
    /// Assemble a pipeline from a course's strategy documents
    pub fn assemble(
        docs: &[ContentNavigationStrategyData],
        course: Arc<dyn CourseStore>,
        user: Arc<dyn UserStore>,
    ) -> Result<AssembledPipeline> {
        let mut warnings = Vec::new();

        if docs.is_empty() {
            return Ok(AssembledPipeline {
                pipeline: None,
                generator_strategies: Vec::new(),
                filter_strategies: Vec::new(),
                warnings,
            });
        }

        let mut generator_docs = Vec::new();
        let mut filter_docs = Vec::new();

        for doc in docs {
            match StrategyKind::from_class(&doc.implementing_class) {
                Some(kind) if kind.is_generator() => generator_docs.push((kind, doc.clone())),
                Some(kind) => filter_docs.push((kind, doc.clone())),
                None => {
                    let message = format!(
                        "unknown strategy type '{}' in document '{}', skipping",
                        doc.implementing_class, doc.id
                    );
                    warn!("{}", message);
                    warnings.push(message);
                }
            }
        }

        // Deterministic filter order: alphabetical by name, id as tie-break
        filter_docs.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let filters: Vec<Arc<dyn CardFilter>> = filter_docs
            .iter()
            .map(|(kind, doc)| Self::build_filter(*kind, doc, &mut warnings))
            .collect();

        let generator: Arc<dyn CardGenerator> = match generator_docs.len() {
            // Filters with nothing to feed them: synthesize the canonical
            // default generator pair so the filters still operate
            0 => {
                warnings.push(
                    "no generator strategy configured, using the default composite".to_string(),
                );
                defaults::default_generator()?
            }
            1 => Self::build_generator(generator_docs[0].0, &generator_docs[0].1),
            _ => {
                let children = generator_docs
                    .iter()
                    .map(|(kind, doc)| Self::build_generator(*kind, doc))
                    .collect();
                Arc::new(CompositeGenerator::new(children, AggregationMode::default())?)
            }
        };

        info!(
            generators = generator_docs.len(),
            filters = filter_docs.len(),
            warnings = warnings.len(),
            "assembled navigation pipeline"
        );

        Ok(AssembledPipeline {
            pipeline: Some(Pipeline::new(generator, filters, course, user)),
            generator_strategies: generator_docs.into_iter().map(|(_, d)| d).collect(),
            filter_strategies: filter_docs.into_iter().map(|(_, d)| d).collect(),
            warnings,
        })
    }

    fn build_generator(
        kind: StrategyKind,
        doc: &ContentNavigationStrategyData,
    ) -> Arc<dyn CardGenerator> {
        match kind {
            StrategyKind::EloGenerator => Arc::new(EloGenerator::new(&doc.id, &doc.name)),
            StrategyKind::SrsGenerator => Arc::new(SrsGenerator::new(&doc.id, &doc.name)),
            StrategyKind::HardcodedOrderGenerator => {
                Arc::new(HardcodedOrderGenerator::from_document(doc))
            }
            // The registry partition guarantees generator kinds here
            _ => unreachable!("filter kind routed to build_generator"),
        }
    }

    fn build_filter(
        kind: StrategyKind,
        doc: &ContentNavigationStrategyData,
        warnings: &mut Vec<String>,
    ) -> Arc<dyn CardFilter> {
        match kind {
            StrategyKind::EloDistanceFilter => Arc::new(EloDistanceFilter::from_document(doc)),
            StrategyKind::HierarchyDefinitionFilter => {
                Arc::new(HierarchyDefinitionFilter::from_document(doc))
            }
            StrategyKind::InterferenceMitigatorFilter => {
                Arc::new(InterferenceMitigatorFilter::from_document(doc))
            }
            StrategyKind::RelativePriorityFilter => {
                Arc::new(RelativePriorityFilter::from_document(doc))
            }
            StrategyKind::WeightedFilter => Self::build_weighted(doc, warnings),
            _ => unreachable!("generator kind routed to build_filter"),
        }
    }

    /// Build a weight decorator, resolving its inner filter through the
    /// registry
    ///
    /// A missing, unknown, or nested-decorator inner degrades to a
    /// passthrough decorator rather than failing assembly.
    fn build_weighted(
        doc: &ContentNavigationStrategyData,
        warnings: &mut Vec<String>,
    ) -> Arc<dyn CardFilter> {
        let config: WeightedConfig =
            serde_json::from_str(&doc.serialized_data).unwrap_or_else(|e| {
                warn!(strategy = %doc.id, error = %e, "malformed weighted config");
                WeightedConfig::default()
            });

        let inner = config.inner.and_then(|inner| {
            let inner_doc = ContentNavigationStrategyData::new(
                format!("{}::inner", doc.id),
                format!("{} (inner)", doc.name),
                &inner.implementing_class,
                &doc.course,
                &inner.serialized_data,
            );

            match StrategyKind::from_class(&inner.implementing_class) {
                Some(kind) if !kind.is_generator() && kind != StrategyKind::WeightedFilter => {
                    Some(Self::build_filter(kind, &inner_doc, warnings))
                }
                Some(_) => {
                    warnings.push(format!(
                        "weighted strategy '{}' cannot wrap '{}', passing through",
                        doc.id, inner.implementing_class
                    ));
                    None
                }
                None => {
                    warnings.push(format!(
                        "weighted strategy '{}' wraps unknown type '{}', passing through",
                        doc.id, inner.implementing_class
                    ));
                    None
                }
            }
        });

        Arc::new(WeightedFilter::new(&doc.id, &doc.name, config.weight, inner))
    }
}
