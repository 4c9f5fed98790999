//! Answers recorded during the Questions step.

use crate::error::ValidationError;
use crate::quiz::question::{Question, QuestionCatalog, QuestionOption};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub option_id: String,
    /// Slider position (0-100) when the question is a slider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
}

/// One answer per question, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<String, Answer>,
}

/// An answer resolved against the catalog, for prompt and payload building.
#[derive(Debug, Clone, Copy)]
pub struct LabeledAnswer<'a> {
    pub question: &'a Question,
    pub option: &'a QuestionOption,
    pub intensity: Option<u8>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the answer for a question after checking it against the catalog.
    pub fn record(
        &mut self,
        catalog: &QuestionCatalog,
        question_id: &str,
        option_id: &str,
        intensity: Option<u8>,
    ) -> Result<(), ValidationError> {
        let question = catalog.find_or_error(question_id)?;
        if question.option(option_id).is_none() {
            return Err(ValidationError::UnknownOption {
                question: question_id.to_string(),
                option: option_id.to_string(),
            });
        }
        if let Some(value) = intensity {
            if value > 100 {
                return Err(ValidationError::IntensityOutOfRange(value));
            }
        }
        self.answers.insert(
            question_id.to_string(),
            Answer {
                option_id: option_id.to_string(),
                intensity,
            },
        );
        Ok(())
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Answer)> {
        self.answers.iter()
    }

    /// True when every catalog question has an answer.
    pub fn is_complete(&self, catalog: &QuestionCatalog) -> bool {
        self.len() == catalog.len() && catalog.questions().iter().all(|q| self.contains(&q.id))
    }

    pub fn ensure_complete(&self, catalog: &QuestionCatalog) -> Result<(), ValidationError> {
        if self.is_complete(catalog) {
            Ok(())
        } else {
            Err(ValidationError::IncompleteAnswers {
                answered: catalog
                    .questions()
                    .iter()
                    .filter(|q| self.contains(&q.id))
                    .count(),
                total: catalog.len(),
            })
        }
    }

    /// Answers in catalog declaration order, with labels resolved.
    ///
    /// Answers whose question or option is unknown to the catalog are skipped.
    pub fn labeled<'a>(&'a self, catalog: &'a QuestionCatalog) -> Vec<LabeledAnswer<'a>> {
        catalog
            .questions()
            .iter()
            .filter_map(|question| {
                let answer = self.answers.get(&question.id)?;
                let option = question.option(&answer.option_id)?;
                Some(LabeledAnswer {
                    question,
                    option,
                    intensity: answer.intensity,
                })
            })
            .collect()
    }
}
