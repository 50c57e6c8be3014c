use stackwise_bedrock::parse::parse_rerank_answer;
use stackwise_core::models::supplement::Supplement;

fn candidates() -> Vec<Supplement> {
    vec![
        Supplement::new("Magnesium Glycinate", "Supports restful sleep"),
        Supplement::new("Electrolyte Mix", "Hydration support"),
        Supplement::new("Green Tea Extract", "Metabolism support"),
    ]
}

#[test]
fn strict_json_with_candidate_id() {
    let c = candidates();
    let raw = format!(
        r#"{{"bestId":"{}","insight":"Great for hydration.","confidence":82}}"#,
        c[1].id
    );

    let outcome = parse_rerank_answer(&raw, &c);
    assert!(outcome.used);
    assert_eq!(outcome.best_id, Some(c[1].id));
    assert_eq!(outcome.insight.as_deref(), Some("Great for hydration."));
    assert_eq!(outcome.confidence, Some(82.0));
}

#[test]
fn json_wrapped_in_prose_is_found() {
    let c = candidates();
    let raw = format!(
        "Sure! Here is my answer:\n```json\n{{\"bestId\":\"{}\",\"insight\":\"Sleep.\",\"confidence\":55}}\n```",
        c[0].id
    );

    let outcome = parse_rerank_answer(&raw, &c);
    assert_eq!(outcome.best_id, Some(c[0].id));
    assert_eq!(outcome.confidence, Some(55.0));
}

#[test]
fn one_based_index_resolves_to_candidate() {
    let c = candidates();
    let outcome = parse_rerank_answer(r#"{"bestId":"3","confidence":60}"#, &c);
    assert_eq!(outcome.best_id, Some(c[2].id));

    let numeric = parse_rerank_answer(r#"{"bestId":2}"#, &c);
    assert_eq!(numeric.best_id, Some(c[1].id));
}

#[test]
fn out_of_range_index_is_dropped() {
    let c = candidates();
    assert_eq!(parse_rerank_answer(r#"{"bestId":"0"}"#, &c).best_id, None);
    assert_eq!(parse_rerank_answer(r#"{"bestId":"9"}"#, &c).best_id, None);
}

#[test]
fn product_name_resolves_case_insensitively() {
    let c = candidates();
    let outcome = parse_rerank_answer(r#"{"bestId":"electrolyte mix"}"#, &c);
    assert_eq!(outcome.best_id, Some(c[1].id));
}

#[test]
fn unknown_id_is_dropped() {
    let c = candidates();
    let raw = format!(r#"{{"bestId":"{}"}}"#, uuid::Uuid::new_v4());
    assert_eq!(parse_rerank_answer(&raw, &c).best_id, None);
}

#[test]
fn confidence_is_clamped() {
    let c = candidates();
    assert_eq!(
        parse_rerank_answer(r#"{"confidence":140}"#, &c).confidence,
        Some(100.0)
    );
    assert_eq!(
        parse_rerank_answer(r#"{"confidence":-5}"#, &c).confidence,
        Some(0.0)
    );
    assert_eq!(
        parse_rerank_answer(r#"{"confidence":"high"}"#, &c).confidence,
        None
    );
}

#[test]
fn malformed_reply_falls_back_to_field_extraction() {
    let c = candidates();
    let raw = r#"bestId: oops {"bestId": "1", "insight": "Calms the mind", "confidence": 64,"#;

    let outcome = parse_rerank_answer(raw, &c);
    assert!(outcome.used);
    assert_eq!(outcome.best_id, Some(c[0].id));
    assert_eq!(outcome.insight.as_deref(), Some("Calms the mind"));
    assert_eq!(outcome.confidence, Some(64.0));
}

#[test]
fn garbage_yields_empty_but_used_outcome() {
    let outcome = parse_rerank_answer("I cannot help with that.", &candidates());
    assert!(outcome.used);
    assert_eq!(outcome.best_id, None);
    assert_eq!(outcome.insight, None);
    assert_eq!(outcome.confidence, None);
}
