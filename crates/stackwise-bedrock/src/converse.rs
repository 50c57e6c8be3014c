//! Reranking via the Bedrock Converse API.
//!
//! The model sees the user's goals, the profile context and a numbered list
//! of candidates, and must answer with one strict JSON object:
//!
//! ```text
//! {"bestId":"<id>", "insight":"<one sentence>", "confidence": 0..100}
//! ```
//!
//! The reply is normalized by [`crate::parse`] before it reaches the ranker.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock,
};
use tracing::info;

use stackwise_core::models::supplement::Supplement;

use crate::error::BedrockError;
use crate::parse::parse_rerank_answer;
use crate::rerank::{RerankOutcome, RerankRequest, Reranker};

const SYSTEM_PROMPT: &str = "You are a precise ranking engine. Output strict JSON only.";

pub struct BedrockReranker {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockReranker {
    pub fn new(config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(config),
            model_id: model_id.into(),
        }
    }
}

/// Render the user turn of the ranking conversation.
pub fn build_prompt(request: &RerankRequest) -> String {
    let goals: Vec<&str> = request.goals.iter().map(|g| g.as_str()).collect();
    let goals = serde_json::to_string(&goals).unwrap_or_else(|_| "[]".to_string());

    let lines: Vec<String> = request
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| candidate_line(i + 1, c))
        .collect();

    format!(
        "User goals: {goals}\n\
         \n\
         {profile}\n\
         \n\
         Supplements:\n\
         {lines}\n\
         \n\
         Task:\n\
         1) Pick ONE best supplement for these goals (bestId MUST be one of the exact 'id=' above).\n\
         2) Return a short \"insight\" (one sentence).\n\
         3) Return \"confidence\" (integer 0-100) = how strongly you'd recommend this for these goals.\n\
         Calibrate confidence:\n\
         - 70-100: High (strong alignment with multiple goals)\n\
         - 40-69: Medium (some alignment or partial fit)\n\
         - 0-39: Low (weak/generic fit)\n\
         Avoid 100 unless extremely strong.\n\
         \n\
         Respond STRICT JSON:\n\
         {{\"bestId\":\"<id>\", \"insight\":\"<one sentence>\", \"confidence\": 0..100}}",
        profile = request.profile_context,
        lines = lines.join("\n"),
    )
}

fn candidate_line(position: usize, c: &Supplement) -> String {
    format!(
        "{position}. id={}; name={}; claims=[{}]; desc={}",
        c.id,
        c.name,
        c.claims.join(", "),
        c.description.as_deref().unwrap_or_default()
    )
}

#[async_trait]
impl Reranker for BedrockReranker {
    async fn rerank(&self, request: RerankRequest) -> Result<RerankOutcome, BedrockError> {
        if request.candidates.is_empty() {
            return Ok(RerankOutcome::unused());
        }

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(build_prompt(&request)))
            .build()
            .map_err(|e| BedrockError::Invocation(e.to_string()))?;

        info!(
            model_id = %self.model_id,
            candidates = request.candidates.len(),
            "reranking candidates"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(SYSTEM_PROMPT.to_string()))
            .messages(message)
            .inference_config(InferenceConfiguration::builder().temperature(0.1).build())
            .send()
            .await
            .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

        let text: String = output_message
            .content()
            .iter()
            .filter_map(|block| {
                if let ContentBlock::Text(t) = block {
                    Some(t.as_str())
                } else {
                    None
                }
            })
            .collect();

        if text.trim().is_empty() {
            return Err(BedrockError::ResponseParse(
                "empty text in response".to_string(),
            ));
        }

        Ok(parse_rerank_answer(&text, &request.candidates))
    }
}
