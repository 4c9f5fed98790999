//! Deterministic prompt construction.
//!
//! The same (archetype, answers, photo presence, options) always yields the
//! same prompt. Answers are listed in catalog order using option labels.

use crate::archetype::Archetype;
use crate::quiz::{AnswerSet, QuestionCatalog};

const PHOTO_CLAUSE: &str = " Transform the reference photo into this sticker, incorporating the \
person's recognizable features (like glasses or a hairstyle) in a creative, stylized and respectful way.";

const GENERIC_PERSONAL_CLAUSE: &str = " The robot may carry subtle, generic personal touches such \
as glasses or a hairstyle, without depicting any real person.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptOptions {
    /// Add a generic personalization hint when the photo step was skipped
    pub personalize_skipped_photo: bool,
}

pub fn build_prompt(
    archetype: &Archetype,
    catalog: &QuestionCatalog,
    answers: Option<&AnswerSet>,
    has_photo: bool,
    options: PromptOptions,
) -> String {
    let mut prompt = format!(
        "A high-quality, circular sticker design in a {palette} theme. \
The background should be {background}. \
The central subject is a robot character of type {character}, with a {pose}. \
The style is futuristic and human-centered. Text on the sticker: '{name}'.",
        palette = archetype.color_palette,
        background = archetype.background_style,
        character = archetype.character_type,
        pose = archetype.character_pose,
        name = archetype.name,
    );

    if let Some(answers) = answers {
        let cues: Vec<String> = answers
            .labeled(catalog)
            .iter()
            .map(|a| {
                let topic = a.question.id.replace('_', " ");
                match a.intensity {
                    Some(intensity) => {
                        format!("{}: {} (intensity {}/100)", topic, a.option.label, intensity)
                    }
                    None => format!("{}: {}", topic, a.option.label),
                }
            })
            .collect();
        if !cues.is_empty() {
            prompt.push_str(" Personality cues: ");
            prompt.push_str(&cues.join("; "));
            prompt.push('.');
        }
    }

    if has_photo {
        prompt.push_str(PHOTO_CLAUSE);
    } else if options.personalize_skipped_photo {
        prompt.push_str(GENERIC_PERSONAL_CLAUSE);
    }
    prompt
}
