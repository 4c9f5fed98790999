//! Archetype enrichment through a text completion provider.

use super::{Archetype, ArchetypeSource};
use crate::error::ApiError;
use crate::provider::{ChatMessage, CompletionOptions, TextProviderClient};
use crate::quiz::{AnswerSet, QuestionCatalog};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const INSTRUCTION: &str = "You are an assistant that maps a user's short answers into a creative \
archetype for a circular sticker. Vary phrasing, color combinations and micro-style hints so \
similar inputs can still produce different results.\n\n\
Return a JSON object ONLY with the following string fields:\n\
- name: short archetype name (e.g. \"Trailblazer\")\n\
- descriptor: one-sentence descriptor\n\
- valueLine: a short value/benefit line\n\
- backgroundStyle: short description of the background style\n\
- robotType: short description of the robot character\n\
- robotPose: short description of the robot pose\n\
- colorPalette: color palette description\n\n\
Do not include any text outside the JSON object.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrichedFields {
    name: String,
    descriptor: String,
    value_line: String,
    background_style: String,
    robot_type: String,
    robot_pose: String,
    color_palette: String,
}

pub struct ArchetypeEnricher {
    client: Arc<dyn TextProviderClient>,
    options: CompletionOptions,
}

impl ArchetypeEnricher {
    pub fn new(client: Arc<dyn TextProviderClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    pub async fn enrich(
        &self,
        catalog: &QuestionCatalog,
        answers: &AnswerSet,
    ) -> Result<Archetype, ApiError> {
        let messages = vec![
            ChatMessage::system(INSTRUCTION),
            ChatMessage::user(format!("User answers:\n{}", answer_lines(catalog, answers))),
        ];
        debug!(
            provider = %self.client.provider_name(),
            model = %self.client.model_name(),
            "requesting archetype enrichment"
        );
        let response = self.client.complete(messages, self.options.clone()).await?;
        debug!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            total_tokens = response.usage.total_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "archetype enrichment completed"
        );
        parse_archetype(&response.content)
    }
}

/// `- question: label` lines in catalog order.
fn answer_lines(catalog: &QuestionCatalog, answers: &AnswerSet) -> String {
    answers
        .labeled(catalog)
        .iter()
        .map(|a| match a.intensity {
            Some(intensity) => format!("- {}: {} ({}/100)", a.question.prompt, a.option.label, intensity),
            None => format!("- {}: {}", a.question.prompt, a.option.label),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the model's reply, tolerating prose around the first JSON object.
pub(crate) fn parse_archetype(content: &str) -> Result<Archetype, ApiError> {
    let fields: EnrichedFields = match serde_json::from_str(content.trim()) {
        Ok(fields) => fields,
        Err(_) => {
            let start = content.find('{');
            let end = content.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&content[start..=end]).map_err(|e| {
                        ApiError::MalformedResponse(format!("enrichment JSON invalid: {}", e))
                    })?
                }
                _ => {
                    return Err(ApiError::MalformedResponse(
                        "enrichment reply contains no JSON object".to_string(),
                    ))
                }
            }
        }
    };

    let archetype = Archetype {
        name: fields.name.trim().to_string(),
        descriptor: fields.descriptor.trim().to_string(),
        value_line: fields.value_line.trim().to_string(),
        color_palette: fields.color_palette.trim().to_string(),
        background_style: fields.background_style.trim().to_string(),
        character_type: fields.robot_type.trim().to_string(),
        character_pose: fields.robot_pose.trim().to_string(),
        source: ArchetypeSource::Enriched,
    };
    if archetype.name.is_empty() {
        return Err(ApiError::MalformedResponse(
            "enrichment returned an empty name".to_string(),
        ));
    }
    Ok(archetype)
}
