//! End-to-end pipeline tests: assemble from strategy documents, run, and
//! inspect the ranked output and its provenance trail.

mod common;

use anamnesis::{CardId, PipelineAssembler, StrategyAction, WeightedCard};
use common::{overdue_review, registration, sample_course, sample_user, strategy_doc, COURSE};
use std::sync::Arc;

fn ids(cards: &[WeightedCard]) -> Vec<String> {
    cards
        .iter()
        .map(|c| c.card_id.as_str().to_string())
        .collect()
}

#[tokio::test]
async fn skill_matched_cards_rank_by_distance() {
    let docs = vec![
        strategy_doc("Skill matching", "EloGenerator", "{}"),
        strategy_doc("Distance decay", "EloDistanceFilter", "{}"),
    ];

    let assembled =
        PipelineAssembler::assemble(&docs, Arc::new(sample_course()), Arc::new(sample_user()))
            .unwrap();
    let cards = assembled.pipeline.unwrap().weighted_cards(5).await.unwrap();

    assert_eq!(cards.len(), 5);
    // Nearest the user's 1000 rating comes first
    assert_eq!(cards[0].card_id, CardId::from("verbs-ser"));
    for pair in cards.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    // Far-off subjunctive content sinks to the bottom of the window
    assert!(!ids(&cards).contains(&"subjunctive-2".to_string()));
}

#[tokio::test]
async fn hierarchy_locks_until_prerequisite_mastered() {
    let hierarchy_blob =
        r#"{"tags": {"subjunctive": [{"tag": "verbs", "minCount": 3, "minElo": 1000}]}}"#;
    let docs = vec![
        strategy_doc("Skill matching", "EloGenerator", "{}"),
        strategy_doc("Prerequisites", "HierarchyDefinitionFilter", hierarchy_blob),
    ];

    // User rated near the subjunctive material but with no interactions on
    // "verbs" yet: subjunctive cards are locked
    let novice = anamnesis::store::memory::MemoryUserStore::new()
        .with_registration(registration(1400.0, &[]));
    let locked = {
        let assembled =
            PipelineAssembler::assemble(&docs, Arc::new(sample_course()), Arc::new(novice))
                .unwrap();
        assembled.pipeline.unwrap().weighted_cards(7).await.unwrap()
    };
    let locked_card = locked
        .iter()
        .find(|c| c.card_id == CardId::from("subjunctive-1"))
        .unwrap();
    let pre_filter = locked_card.provenance[0].score;
    assert!(pre_filter > 0.0);
    assert!((locked_card.score - pre_filter * 0.01).abs() < 1e-6);

    // "verbs" mastered: the same card scores at its unpenalized value
    let user = anamnesis::store::memory::MemoryUserStore::new()
        .with_registration(registration(1400.0, &[("verbs", 1100.0, 10)]));
    let unlocked = {
        let assembled =
            PipelineAssembler::assemble(&docs, Arc::new(sample_course()), Arc::new(user))
                .unwrap();
        assembled.pipeline.unwrap().weighted_cards(7).await.unwrap()
    };
    let unlocked_card = unlocked
        .iter()
        .find(|c| c.card_id == CardId::from("subjunctive-1"))
        .unwrap();
    assert_eq!(unlocked_card.score, unlocked_card.provenance[0].score);
}

#[tokio::test]
async fn reviews_flow_through_default_composite() {
    let user = sample_user().with_review(overdue_review("greetings-1", 4));

    // Filters only: the assembler synthesizes the ELO+SRS composite
    let docs = vec![strategy_doc("Distance decay", "EloDistanceFilter", "{}")];
    let assembled =
        PipelineAssembler::assemble(&docs, Arc::new(sample_course()), Arc::new(user)).unwrap();
    assert_eq!(assembled.warnings.len(), 1);

    let cards = assembled.pipeline.unwrap().weighted_cards(7).await.unwrap();

    let review_card = cards
        .iter()
        .find(|c| c.card_id == CardId::from("greetings-1"))
        .unwrap();
    assert!(review_card.review_id.is_some());
}

#[tokio::test]
async fn tags_are_hydrated_for_every_candidate() {
    let docs = vec![strategy_doc("Skill matching", "EloGenerator", "{}")];
    let assembled =
        PipelineAssembler::assemble(&docs, Arc::new(sample_course()), Arc::new(sample_user()))
            .unwrap();

    let cards = assembled.pipeline.unwrap().weighted_cards(7).await.unwrap();

    for card in &cards {
        assert!(card.tags.is_some(), "card {} missing tags", card.card_id);
    }
    let verbs = cards
        .iter()
        .find(|c| c.card_id == CardId::from("verbs-ser"))
        .unwrap();
    assert!(verbs.tag_slice().contains(&"verbs".to_string()));
}

#[tokio::test]
async fn provenance_records_every_stage_in_order() {
    let docs = vec![
        strategy_doc("Skill matching", "EloGenerator", "{}"),
        strategy_doc("Avoid confusion", "InterferenceMitigatorFilter", "{}"),
        strategy_doc("Distance decay", "EloDistanceFilter", "{}"),
    ];

    let assembled =
        PipelineAssembler::assemble(&docs, Arc::new(sample_course()), Arc::new(sample_user()))
            .unwrap();
    let cards = assembled.pipeline.unwrap().weighted_cards(3).await.unwrap();

    for card in &cards {
        assert_eq!(card.provenance.len(), 3);
        assert_eq!(card.provenance[0].action, StrategyAction::Generated);
        // Alphabetical filter order: "Avoid confusion" before "Distance decay"
        assert_eq!(card.provenance[1].strategy, "interference-filter");
        assert_eq!(card.provenance[2].strategy, "elo-distance-filter");
        // Each entry snapshots the score it left behind
        assert_eq!(card.provenance[2].score, card.score);
    }
}

#[tokio::test]
async fn shuffled_document_order_yields_identical_ranking() {
    let docs = vec![
        strategy_doc("Skill matching", "EloGenerator", "{}"),
        strategy_doc("Distance decay", "EloDistanceFilter", "{}"),
        strategy_doc(
            "Priorities",
            "RelativePriorityFilter",
            r#"{"priorities": {"greetings": 0.9}}"#,
        ),
        strategy_doc("Avoid confusion", "InterferenceMitigatorFilter", "{}"),
    ];
    let mut shuffled = docs.clone();
    shuffled.reverse();
    shuffled.swap(0, 1);

    let run = |docs: Vec<anamnesis::ContentNavigationStrategyData>| async move {
        let assembled = PipelineAssembler::assemble(
            &docs,
            Arc::new(sample_course()),
            Arc::new(sample_user()),
        )
        .unwrap();
        assembled.pipeline.unwrap().weighted_cards(7).await.unwrap()
    };

    let a = run(docs).await;
    let b = run(shuffled).await;

    assert_eq!(ids(&a), ids(&b));
    let scores = |cards: &[WeightedCard]| -> Vec<f32> { cards.iter().map(|c| c.score).collect() };
    assert_eq!(scores(&a), scores(&b));
}

#[tokio::test]
async fn hardcoded_order_course_serves_in_sequence() {
    let blob = r#"{"cardIds": ["greetings-1", "greetings-2", "verbs-ser"]}"#;
    let docs = vec![strategy_doc("Lesson order", "HardcodedOrderGenerator", blob)];

    let assembled =
        PipelineAssembler::assemble(&docs, Arc::new(sample_course()), Arc::new(sample_user()))
            .unwrap();
    let cards = assembled.pipeline.unwrap().weighted_cards(3).await.unwrap();

    assert_eq!(ids(&cards), ["greetings-1", "greetings-2", "verbs-ser"]);
}

#[tokio::test]
async fn empty_course_returns_empty_list_not_error() {
    let course = anamnesis::store::memory::MemoryCourseStore::new(COURSE);
    let docs = vec![strategy_doc("Skill matching", "EloGenerator", "{}")];

    let assembled =
        PipelineAssembler::assemble(&docs, Arc::new(course), Arc::new(sample_user())).unwrap();
    let cards = assembled.pipeline.unwrap().weighted_cards(10).await.unwrap();

    assert!(cards.is_empty());
}

#[tokio::test]
async fn weighted_decorator_dampens_distance_decay() {
    let base_docs = vec![
        strategy_doc("Skill matching", "EloGenerator", "{}"),
        strategy_doc("Distance decay", "EloDistanceFilter", "{}"),
    ];
    let damped_docs = vec![
        strategy_doc("Skill matching", "EloGenerator", "{}"),
        strategy_doc(
            "Distance decay",
            "WeightedFilter",
            r#"{"weight": 0.25, "inner": {"implementingClass": "EloDistanceFilter", "serializedData": "{}"}}"#,
        ),
    ];

    let run = |docs: Vec<anamnesis::ContentNavigationStrategyData>| async move {
        let assembled = PipelineAssembler::assemble(
            &docs,
            Arc::new(sample_course()),
            Arc::new(sample_user()),
        )
        .unwrap();
        assembled.pipeline.unwrap().weighted_cards(7).await.unwrap()
    };

    let full = run(base_docs).await;
    let damped = run(damped_docs).await;

    let far_full = full
        .iter()
        .find(|c| c.card_id == CardId::from("nouns-gender"))
        .unwrap();
    let far_damped = damped
        .iter()
        .find(|c| c.card_id == CardId::from("nouns-gender"))
        .unwrap();

    // A fractional weight softens the penalty on distant cards
    assert!(far_damped.score > far_full.score);
    assert_eq!(
        far_damped.last_contribution().unwrap().effective_weight,
        Some(0.25)
    );
}
