//! Transition function.

use super::session::Session;
use super::state::{Step, WizardEvent};
use crate::collaborators::{EmailMessage, SubmissionSummary, SubmitAction};
use crate::contact::{normalize_email, normalize_name};
use crate::error::{ApiError, ValidationError};
use crate::generation::GenerationResult;
use crate::image::InlineImage;
use crate::quiz::{AnswerSet, QuestionCatalog};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowSettings {
    /// Insert the EmailCapture step between the last question and Photo
    pub email_capture: bool,
}

/// Work to start after the session lock is released
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub session_id: String,
    pub epoch: u64,
    pub answers: AnswerSet,
    pub photo: Option<InlineImage>,
}

#[derive(Debug, Clone)]
pub enum Effect {
    None,
    Generate(GenerationJob),
    Submit(SubmissionSummary),
    Email(EmailMessage),
}

#[derive(Clone)]
pub struct Wizard {
    catalog: Arc<QuestionCatalog>,
    flow: FlowSettings,
}

impl Wizard {
    pub fn new(catalog: Arc<QuestionCatalog>, flow: FlowSettings) -> Self {
        Self { catalog, flow }
    }

    pub fn catalog(&self) -> &Arc<QuestionCatalog> {
        &self.catalog
    }

    pub fn flow(&self) -> FlowSettings {
        self.flow
    }

    /// Apply one event.
    ///
    /// Validation failures leave the step unchanged and record the message on
    /// the session. Events not accepted by the current step are rejected with
    /// `InvalidTransition` and change nothing.
    pub fn apply(&self, session: &mut Session, event: WizardEvent) -> Result<Effect, ApiError> {
        let from = session.step;
        let event_name = event.name();
        session.touch();

        match self.transition(session, event) {
            Ok(effect) => {
                if session.step != from {
                    info!(
                        session = %session.id,
                        from = from.as_str(),
                        to = session.step.as_str(),
                        event = event_name,
                        "wizard transition"
                    );
                }
                Ok(effect)
            }
            Err(ApiError::Validation(err)) => {
                debug!(session = %session.id, event = event_name, error = %err, "input rejected");
                session.error = Some(err.to_string());
                Err(ApiError::Validation(err))
            }
            Err(err) => Err(err),
        }
    }

    fn transition(&self, session: &mut Session, event: WizardEvent) -> Result<Effect, ApiError> {
        // Step-independent events
        match event {
            WizardEvent::Restart => {
                session.reset();
                return Ok(Effect::None);
            }
            WizardEvent::ConnectivityLost { message } => {
                session.banner = Some(message);
                return Ok(Effect::None);
            }
            WizardEvent::DismissError => {
                session.banner = None;
                session.error = None;
                return Ok(Effect::None);
            }
            _ => {}
        }

        let last_question = self.catalog.len().saturating_sub(1);
        let effect = match (session.step, event) {
            (Step::Welcome, WizardEvent::Start) => {
                session.step = Step::NameInput;
                Effect::None
            }
            (Step::NameInput, WizardEvent::SubmitName { name }) => {
                session.name = Some(normalize_name(&name)?);
                session.step = self.first_question_step();
                Effect::None
            }
            (Step::NameInput, WizardEvent::Previous) => {
                session.step = Step::Welcome;
                Effect::None
            }
            (Step::Questions { index }, WizardEvent::SelectOption { option_id, intensity }) => {
                self.select_option(session, index, &option_id, intensity)?;
                Effect::None
            }
            (Step::Questions { index }, WizardEvent::AdjustSlider { value }) => {
                self.adjust_slider(session, index, value)?;
                Effect::None
            }
            (Step::Questions { index }, WizardEvent::Next) => {
                let question = self.question(index)?;
                if !session.answers.contains(&question.id) {
                    return Err(ValidationError::MissingAnswer(question.id.clone()).into());
                }
                session.step = if index < last_question {
                    Step::Questions { index: index + 1 }
                } else if self.flow.email_capture {
                    Step::EmailCapture
                } else {
                    Step::Photo
                };
                Effect::None
            }
            (Step::Questions { index }, WizardEvent::Previous) => {
                session.step = match index {
                    0 => Step::NameInput,
                    i => Step::Questions { index: i - 1 },
                };
                Effect::None
            }
            (Step::EmailCapture, WizardEvent::SubmitEmail { email }) => {
                session.email = Some(normalize_email(&email)?);
                session.step = Step::Photo;
                Effect::None
            }
            (Step::EmailCapture, WizardEvent::Previous) => {
                session.step = Step::Questions {
                    index: last_question,
                };
                Effect::None
            }
            (Step::Photo, WizardEvent::Previous) => {
                session.step = if self.flow.email_capture {
                    Step::EmailCapture
                } else {
                    Step::Questions {
                        index: last_question,
                    }
                };
                Effect::None
            }
            (Step::Photo, WizardEvent::ConfirmPhoto { photo }) => {
                let photo = InlineImage::from_data_url(&photo)?;
                self.start_generation(session, Some(photo))?
            }
            (Step::Photo, WizardEvent::SkipPhoto) => self.start_generation(session, None)?,
            (Step::Result, WizardEvent::Share) => {
                let summary = self.summary(session, SubmitAction::Share)?;
                session.step = Step::ThankYou;
                Effect::Submit(summary)
            }
            (Step::Result, WizardEvent::Print) => {
                let summary = self.summary(session, SubmitAction::Print)?;
                session.step = Step::ThankYou;
                Effect::Submit(summary)
            }
            (Step::Result, WizardEvent::EmailResult { to }) => self.email_result(session, to)?,
            (step, event) => {
                return Err(ApiError::InvalidTransition {
                    step: step.as_str().to_string(),
                    action: event.name().to_string(),
                })
            }
        };

        session.error = None;
        Ok(effect)
    }

    /// Record a finished generation.
    ///
    /// Returns the submission to dispatch on entering `Result`, or `None` when
    /// the result belongs to an earlier epoch (the session was restarted) and
    /// has been discarded.
    pub fn complete_generation(
        &self,
        session: &mut Session,
        epoch: u64,
        result: GenerationResult,
    ) -> Option<Effect> {
        if session.epoch != epoch || session.step != Step::Generating {
            debug!(
                session = %session.id,
                result_epoch = epoch,
                session_epoch = session.epoch,
                "discarding stale generation result"
            );
            return None;
        }
        info!(
            session = %session.id,
            archetype = %result.archetype.name,
            path = result.path.as_str(),
            "generation complete"
        );
        session.result = Some(result);
        session.step = Step::Result;
        session.touch();
        self.summary(session, SubmitAction::Result)
            .ok()
            .map(Effect::Submit)
    }

    fn first_question_step(&self) -> Step {
        if self.catalog.is_empty() {
            if self.flow.email_capture {
                Step::EmailCapture
            } else {
                Step::Photo
            }
        } else {
            Step::Questions { index: 0 }
        }
    }

    fn question(&self, index: usize) -> Result<&crate::quiz::Question, ApiError> {
        self.catalog.get(index).ok_or_else(|| {
            ValidationError::UnknownQuestion(format!("#{}", index)).into()
        })
    }

    fn select_option(
        &self,
        session: &mut Session,
        index: usize,
        option_id: &str,
        intensity: Option<u8>,
    ) -> Result<(), ApiError> {
        let question = self.question(index)?;
        if question.is_slider() {
            let option = question
                .option(option_id)
                .ok_or_else(|| ValidationError::UnknownOption {
                    question: question.id.clone(),
                    option: option_id.to_string(),
                })?;
            let value = match intensity.or(option.scale_value) {
                Some(value) => value,
                None => return Err(ValidationError::NotASlider(question.id.clone()).into()),
            };
            return self.adjust_slider(session, index, value);
        }
        session
            .answers
            .record(&self.catalog, &question.id, option_id, intensity)?;
        Ok(())
    }

    fn adjust_slider(&self, session: &mut Session, index: usize, value: u8) -> Result<(), ApiError> {
        let question = self.question(index)?;
        let option = question.slider_option(value)?;
        session
            .answers
            .record(&self.catalog, &question.id, &option.id, Some(value))?;
        Ok(())
    }

    fn start_generation(
        &self,
        session: &mut Session,
        photo: Option<InlineImage>,
    ) -> Result<Effect, ApiError> {
        session.answers.ensure_complete(&self.catalog)?;
        session.step = Step::Generating;
        Ok(Effect::Generate(GenerationJob {
            session_id: session.id.clone(),
            epoch: session.epoch,
            answers: session.answers.clone(),
            photo,
        }))
    }

    fn email_result(&self, session: &Session, to: Option<String>) -> Result<Effect, ApiError> {
        let recipient = to
            .filter(|t| !t.trim().is_empty())
            .or_else(|| session.email.clone())
            .ok_or(ValidationError::MissingEmail)?;
        let recipient = normalize_email(&recipient)?;
        let result = self.result(session)?;
        Ok(Effect::Email(EmailMessage {
            to: recipient,
            subject: format!(
                "{} Sticker for {}",
                result.archetype.name,
                session.name.as_deref().unwrap_or("you")
            ),
            text: result.archetype.value_line.clone(),
            attachment: Some(result.image.clone()),
        }))
    }

    fn summary(&self, session: &Session, action: SubmitAction) -> Result<SubmissionSummary, ApiError> {
        let result = self.result(session)?;
        Ok(SubmissionSummary {
            session_id: session.id.clone(),
            name: session.name.clone().unwrap_or_default(),
            email: session.email.clone(),
            answers: session.answers.clone(),
            archetype: result.archetype.clone(),
            image: result.image.clone(),
            image_url: result.image_url.clone(),
            action,
            timestamp: Utc::now(),
        })
    }

    fn result<'a>(&self, session: &'a Session) -> Result<&'a GenerationResult, ApiError> {
        session.result.as_ref().ok_or_else(|| ApiError::InvalidTransition {
            step: session.step.as_str().to_string(),
            action: "use_result".to_string(),
        })
    }
}
