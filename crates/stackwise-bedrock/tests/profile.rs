use stackwise_bedrock::converse::build_prompt;
use stackwise_bedrock::profile::{ProfileReranker, PROFILE_CONFIDENCE};
use stackwise_bedrock::rerank::{RerankOutcome, RerankRequest, Reranker};
use stackwise_core::models::goal::Goal;
use stackwise_core::models::supplement::Supplement;

fn request(candidates: Vec<Supplement>, goals: Vec<Goal>) -> RerankRequest {
    RerankRequest {
        goals,
        candidates,
        profile_context: "User Profile Context:\nAge: 40".to_string(),
    }
}

#[tokio::test]
async fn picks_first_candidate_with_fixed_confidence() {
    let first = Supplement::new("Melatonin", "sleep");
    let second = Supplement::new("Electrolytes", "hydration");
    let outcome = ProfileReranker
        .rerank(request(
            vec![first.clone(), second],
            vec![Goal::BetterSleep, Goal::Hydration],
        ))
        .await
        .unwrap();

    assert!(outcome.used);
    assert_eq!(outcome.best_id, Some(first.id));
    assert_eq!(outcome.confidence, Some(PROFILE_CONFIDENCE));
    assert_eq!(
        outcome.insight.as_deref(),
        Some(
            "Based on your profile:\nUser Profile Context:\nAge: 40\n\n\
             This supplement best matches your goals: Better Sleep, Hydration."
        )
    );
}

#[tokio::test]
async fn no_goals_uses_overall_fit_wording() {
    let outcome = ProfileReranker
        .rerank(request(vec![Supplement::new("Zinc", "")], vec![]))
        .await
        .unwrap();
    let insight = outcome.insight.unwrap();
    assert!(insight.ends_with("strongest overall fit for your health profile."));
}

#[tokio::test]
async fn empty_pool_is_unused() {
    let outcome = ProfileReranker
        .rerank(request(vec![], vec![Goal::Hydration]))
        .await
        .unwrap();
    assert_eq!(outcome, RerankOutcome::unused());
}

#[test]
fn prompt_lists_numbered_candidates_and_goals() {
    let mut magnesium = Supplement::new("Magnesium", "Relaxation");
    magnesium.claims = vec!["sleep".into(), "calm".into()];
    let req = request(vec![magnesium.clone()], vec![Goal::BetterSleep]);

    let prompt = build_prompt(&req);
    assert!(prompt.starts_with("User goals: [\"Better Sleep\"]"));
    assert!(prompt.contains("Age: 40"));
    assert!(prompt.contains(&format!(
        "1. id={}; name=Magnesium; claims=[sleep, calm]; desc=Relaxation",
        magnesium.id
    )));
    assert!(prompt.contains("Respond STRICT JSON:"));
}
