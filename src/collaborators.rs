//! External collaborators reached after generation: object storage, email
//! relay, workflow webhook, and the submission pipeline that ties them
//! together. Each is a trait so the service wires real clients at startup and
//! tests substitute stubs.

pub mod email;
pub mod sink;
pub mod storage;
pub mod submission;
pub mod webhook;

pub use email::{EmailMessage, EmailRelay, SmtpRelay, SmtpSettings};
pub use sink::{CollaboratorSink, SubmissionSink, SubmissionSummary, SubmitAction};
pub use storage::{object_name, ObjectStore, RestObjectStore};
pub use submission::{RequestMetadata, SubmissionReceipt, SubmissionService, UserDataRequest};
pub use webhook::{HttpWebhookClient, WebhookClient, WebhookPayload};
