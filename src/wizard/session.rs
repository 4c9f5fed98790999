//! Per-user wizard session.

use super::state::Step;
use crate::generation::GenerationResult;
use crate::quiz::{AnswerSet, Question, QuestionCatalog};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub fn new_session_id() -> String {
    let ts = now_millis();
    let pid = std::process::id();
    let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("sess-{ts}-{pid}-{seq}")
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub step: Step,
    pub name: Option<String>,
    pub email: Option<String>,
    pub answers: AnswerSet,
    pub result: Option<GenerationResult>,
    /// Inline validation message for the current step
    pub error: Option<String>,
    /// Dismissible connectivity banner
    pub banner: Option<String>,
    /// Bumped on restart; generation results carry the epoch they started in
    pub epoch: u64,
    pub updated_at_ms: u64,
}

impl Session {
    pub fn new(id: String) -> Self {
        Self {
            id,
            step: Step::Welcome,
            name: None,
            email: None,
            answers: AnswerSet::new(),
            result: None,
            error: None,
            banner: None,
            epoch: 0,
            updated_at_ms: now_millis(),
        }
    }

    /// Back to `Welcome` with everything cleared except the id.
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Session::new(std::mem::take(&mut self.id));
        self.epoch = epoch;
    }

    pub fn touch(&mut self) {
        self.updated_at_ms = now_millis();
    }

    pub fn question_index(&self) -> Option<usize> {
        match self.step {
            Step::Questions { index } => Some(index),
            _ => None,
        }
    }

    pub fn view(&self, catalog: &QuestionCatalog) -> SessionView {
        let question_index = self.question_index();
        SessionView {
            id: self.id.clone(),
            step: self.step,
            question_index,
            total_questions: catalog.len(),
            question: question_index.and_then(|i| catalog.get(i)).cloned(),
            name: self.name.clone(),
            email: self.email.clone(),
            answers: self.answers.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
            banner: self.banner.clone(),
        }
    }
}

/// Client-facing snapshot of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub step: Step,
    pub question_index: Option<usize>,
    pub total_questions: usize,
    pub question: Option<Question>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub answers: AnswerSet,
    pub result: Option<GenerationResult>,
    pub error: Option<String>,
    pub banner: Option<String>,
}
