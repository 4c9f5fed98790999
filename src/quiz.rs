//! Quiz data model
//!
//! Immutable question catalog and the user's answer set.

pub mod answer;
pub mod question;

pub use answer::{Answer, AnswerSet, LabeledAnswer};
pub use question::{Layout, Question, QuestionCatalog, QuestionOption};
