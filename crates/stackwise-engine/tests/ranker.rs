mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{
    engine, fixture, set_onboarding_goals, settle, CountingCatalog, FailingLogs, FailingReranker,
    ScriptedReranker, SlowReranker,
};
use stackwise_core::models::goal::{Goal, HealthGoalRecord};
use stackwise_core::models::recommendation::{
    ConfidenceLabel, RecommendationAction, RecommendationTag,
};
use stackwise_core::models::supplement::Supplement;
use stackwise_engine::Engine;
use stackwise_storage::Stores;
use uuid::Uuid;

#[tokio::test]
async fn pick_one_takes_highest_score_rule_based() {
    let f = fixture().await;
    let payload = engine(&f.stores)
        .pick_one(f.user, &HashSet::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(payload.supplement.id, f.sleep_and_hydration.id);
    assert_eq!(
        payload.matched_goals,
        vec![Goal::BetterSleep, Goal::Hydration]
    );
    assert_eq!(payload.confidence_score, 60);
    assert_eq!(payload.confidence_label, ConfidenceLabel::Medium);
    assert_eq!(payload.recommendation_tag, RecommendationTag::SmartSuggestion);
    assert_eq!(payload.ai_insight, None);
    assert_eq!(payload.reason, None);
}

#[tokio::test]
async fn single_goal_match_reports_band_floor() {
    let f = fixture().await;
    f.stores
        .goals
        .put_health_goals(HealthGoalRecord {
            user_id: f.user,
            sleep_target: 7.0,
            ..Default::default()
        })
        .await
        .unwrap();

    let exclude = HashSet::from([f.sleep_and_hydration.id]);
    let payload = engine(&f.stores)
        .pick_one(f.user, &exclude)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(payload.supplement.id, f.melatonin.id);
    assert_eq!(payload.matched_goals, vec![Goal::BetterSleep]);
    assert_eq!(payload.confidence_score, 45);
    assert_eq!(payload.confidence_label, ConfidenceLabel::Medium);
}

#[tokio::test]
async fn pick_one_without_goals_still_answers_with_floor_confidence() {
    let f = fixture().await;
    let stranger = Uuid::new_v4();

    let payload = engine(&f.stores)
        .pick_one(stranger, &HashSet::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(payload.supplement.id, f.vitamin_c.id);
    assert!(payload.matched_goals.is_empty());
    assert_eq!(payload.confidence_score, 15);
    assert_eq!(payload.confidence_label, ConfidenceLabel::Low);
}

#[tokio::test]
async fn pick_one_with_everything_excluded_is_none() {
    let f = fixture().await;
    let exclude = HashSet::from([
        f.vitamin_c.id,
        f.melatonin.id,
        f.electrolytes.id,
        f.sleep_and_hydration.id,
    ]);

    let picked = engine(&f.stores).pick_one(f.user, &exclude).await.unwrap();
    assert!(picked.is_none());
}

#[tokio::test]
async fn pick_one_logs_suggestion_in_background() {
    let f = fixture().await;
    let payload = engine(&f.stores)
        .pick_one(f.user, &HashSet::new())
        .await
        .unwrap()
        .unwrap();
    settle().await;

    let logged = f
        .stores
        .logs
        .recent(f.user, RecommendationAction::Suggested, 10)
        .await
        .unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].supplement_id, payload.supplement.id);
    let meta = logged[0].meta.as_ref().unwrap();
    assert_eq!(meta["score"], 60);
    assert_eq!(meta["tag"], "Smart Suggestion");
    assert_eq!(meta["confidence"], 60);
}

#[tokio::test]
async fn failed_suggestion_log_does_not_fail_pick() {
    let f = fixture().await;
    let stores = Stores {
        logs: Arc::new(FailingLogs),
        ..f.stores.clone()
    };

    let picked = Engine::new(stores)
        .pick_one(f.user, &HashSet::new())
        .await
        .unwrap();
    settle().await;
    assert!(picked.is_some());
}

#[tokio::test]
async fn reranker_pick_is_promoted_with_external_confidence() {
    let f = fixture().await;
    let reranker = ScriptedReranker::picking(f.electrolytes.id, Some(91.6));
    let engine = Engine::new(f.stores.clone())
        .with_reranker(reranker.clone(), Duration::from_secs(1));

    let payload = engine
        .pick_one(f.user, &HashSet::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(reranker.calls.load(Ordering::SeqCst), 1);
    assert_eq!(payload.supplement.id, f.electrolytes.id);
    assert_eq!(payload.recommendation_tag, RecommendationTag::AiSelected);
    assert_eq!(payload.confidence_score, 92);
    assert_eq!(payload.confidence_label, ConfidenceLabel::High);
    assert_eq!(payload.ai_insight.as_deref(), Some("Scripted insight."));
}

#[tokio::test]
async fn unknown_reranker_pick_keeps_rule_top_but_tags_ai() {
    let f = fixture().await;
    let reranker = ScriptedReranker::picking(Uuid::new_v4(), None);
    let engine =
        Engine::new(f.stores.clone()).with_reranker(reranker, Duration::from_secs(1));

    let payload = engine
        .pick_one(f.user, &HashSet::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(payload.supplement.id, f.sleep_and_hydration.id);
    assert_eq!(payload.recommendation_tag, RecommendationTag::AiSelected);
    // No external confidence: rule-based value.
    assert_eq!(payload.confidence_score, 60);
}

#[tokio::test]
async fn failing_reranker_falls_back_to_rules() {
    let f = fixture().await;
    let engine = Engine::new(f.stores.clone())
        .with_reranker(Arc::new(FailingReranker), Duration::from_secs(1));

    let payload = engine
        .pick_one(f.user, &HashSet::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload.supplement.id, f.sleep_and_hydration.id);
    assert_eq!(payload.recommendation_tag, RecommendationTag::SmartSuggestion);
}

#[tokio::test(start_paused = true)]
async fn slow_reranker_times_out() {
    let f = fixture().await;
    let engine = Engine::new(f.stores.clone())
        .with_reranker(Arc::new(SlowReranker), Duration::from_millis(50));

    let payload = engine
        .pick_one(f.user, &HashSet::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload.recommendation_tag, RecommendationTag::SmartSuggestion);
}

#[tokio::test]
async fn pick_list_without_goals_never_reads_catalog() {
    let f = fixture().await;
    let catalog = Arc::new(CountingCatalog {
        inner: f.memory.clone(),
        reads: AtomicUsize::new(0),
    });
    let stores = Stores {
        catalog: catalog.clone(),
        ..f.stores.clone()
    };

    let list = Engine::new(stores)
        .pick_list(Uuid::new_v4(), 10, &HashSet::new())
        .await
        .unwrap();

    assert!(list.is_empty());
    assert_eq!(catalog.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pick_list_keeps_only_matches_in_score_order() {
    let f = fixture().await;
    let list = engine(&f.stores)
        .pick_list(f.user, 10, &HashSet::new())
        .await
        .unwrap();

    let ids: Vec<Uuid> = list.iter().map(|p| p.supplement.id).collect();
    assert_eq!(
        ids,
        vec![f.sleep_and_hydration.id, f.melatonin.id, f.electrolytes.id]
    );
    assert!(list.iter().all(|p| p.confidence_score >= 45));
    assert!(list
        .iter()
        .all(|p| p.recommendation_tag == RecommendationTag::SmartSuggestion));

    assert_eq!(
        list[0].reason.as_deref(),
        Some(
            "Recommended for Better Sleep, Hydration because this supplement directly supports those health goals."
        )
    );
    let insight = list[1].ai_insight.as_deref().unwrap();
    assert!(insight.starts_with("Considering your profile: User Profile Context:\n"));
    assert!(insight.ends_with("This supplement is chosen to enhance your Better Sleep journey."));
}

#[tokio::test]
async fn pick_list_clamps_limit() {
    let f = fixture().await;
    let engine = engine(&f.stores);

    let one = engine.pick_list(f.user, 0, &HashSet::new()).await.unwrap();
    assert_eq!(one.len(), 1);

    for i in 0..60 {
        f.stores
            .catalog
            .put_supplement(Supplement::new(format!("Sleep Aid {i}"), "sleep"))
            .await
            .unwrap();
    }
    let capped = engine.pick_list(f.user, 500, &HashSet::new()).await.unwrap();
    assert_eq!(capped.len(), 50);
}

#[tokio::test]
async fn pick_list_uses_onboarding_goals() {
    let f = fixture().await;
    let user = Uuid::new_v4();
    set_onboarding_goals(&f.stores, user, vec![Goal::Hydration, Goal::from("Focus")]).await;

    let list = engine(&f.stores)
        .pick_list(user, 10, &HashSet::new())
        .await
        .unwrap();
    let ids: Vec<Uuid> = list.iter().map(|p| p.supplement.id).collect();
    assert_eq!(ids, vec![f.electrolytes.id, f.sleep_and_hydration.id]);
}

#[tokio::test]
async fn reranker_only_relabels_list() {
    let f = fixture().await;
    let reranker = ScriptedReranker::picking(f.electrolytes.id, Some(99.0));
    let engine =
        Engine::new(f.stores.clone()).with_reranker(reranker, Duration::from_secs(1));

    let list = engine
        .pick_list(f.user, 10, &HashSet::new())
        .await
        .unwrap();

    let ids: Vec<Uuid> = list.iter().map(|p| p.supplement.id).collect();
    assert_eq!(
        ids,
        vec![f.sleep_and_hydration.id, f.melatonin.id, f.electrolytes.id]
    );
    let tags: Vec<RecommendationTag> = list.iter().map(|p| p.recommendation_tag).collect();
    assert_eq!(
        tags,
        vec![
            RecommendationTag::SmartSuggestion,
            RecommendationTag::SmartSuggestion,
            RecommendationTag::AiSelected,
        ]
    );
    // List confidence stays rule-based.
    assert_eq!(list[2].confidence_score, 45);
}

#[tokio::test]
async fn pick_list_twice_yields_same_membership() {
    let f = fixture().await;
    let engine = engine(&f.stores);

    let first: HashSet<Uuid> = engine
        .pick_list(f.user, 10, &HashSet::new())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.supplement.id)
        .collect();
    let second: HashSet<Uuid> = engine
        .pick_list(f.user, 10, &HashSet::new())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.supplement.id)
        .collect();
    assert_eq!(first, second);
}
