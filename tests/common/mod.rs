//! Common test utilities and fixture builders

use anamnesis::store::memory::{MemoryCourseStore, MemoryUserStore};
use anamnesis::types::{CourseElo, CourseRegistration, EloScore, PendingReview};
use anamnesis::ContentNavigationStrategyData;
use chrono::{Duration, Utc};

pub const COURSE: &str = "spanish-101";

/// A small course with ratings spread around 1000 and a few tags
pub fn sample_course() -> MemoryCourseStore {
    MemoryCourseStore::new(COURSE)
        .with_card("greetings-1", 900.0, &["greetings"])
        .with_card("greetings-2", 950.0, &["greetings"])
        .with_card("verbs-ser", 1000.0, &["verbs", "ser-estar"])
        .with_card("verbs-estar", 1010.0, &["verbs", "ser-estar"])
        .with_card("nouns-gender", 1100.0, &["nouns"])
        .with_card("subjunctive-1", 1500.0, &["verbs", "subjunctive"])
        .with_card("subjunctive-2", 1600.0, &["verbs", "subjunctive"])
}

/// A registration at the given global rating with per-tag breakdowns
pub fn registration(global: f32, tags: &[(&str, f32, u32)]) -> CourseRegistration {
    let mut elo = CourseElo {
        global: EloScore {
            score: global,
            count: 50,
        },
        ..Default::default()
    };
    for (tag, score, count) in tags {
        elo.tags.insert(
            tag.to_string(),
            EloScore {
                score: *score,
                count: *count,
            },
        );
    }
    CourseRegistration {
        course_id: COURSE.into(),
        elo,
    }
}

/// A user registered at rating 1000 with no tag history
pub fn sample_user() -> MemoryUserStore {
    MemoryUserStore::new().with_registration(registration(1000.0, &[]))
}

/// A review that came due `days_overdue` days ago
pub fn overdue_review(card: &str, days_overdue: i64) -> PendingReview {
    PendingReview {
        review_id: format!("r-{}", card).as_str().into(),
        card_id: card.into(),
        course_id: COURSE.into(),
        due: Utc::now() - Duration::days(days_overdue),
        interval_days: 2.0,
    }
}

/// A strategy document with a unique id
pub fn strategy_doc(name: &str, class: &str, blob: &str) -> ContentNavigationStrategyData {
    ContentNavigationStrategyData::new(
        format!("strat-{}", uuid::Uuid::new_v4()),
        name,
        class,
        COURSE,
        blob,
    )
}
