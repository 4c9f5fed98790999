//! Wizard: the session state machine
//!
//! `Welcome → NameInput → Questions(i) → [EmailCapture] → Photo → Generating
//! → Result → ThankYou`, with `Restart` from anywhere.
//!
//! The controller is synchronous: applying an event mutates the session and
//! returns an [`Effect`] describing any async work. The runtime performs that
//! work outside the session lock and feeds generation results back through an
//! epoch check so results from before a restart are dropped.

pub mod controller;
pub mod runtime;
pub mod session;
pub mod state;

pub use controller::{Effect, FlowSettings, GenerationJob, Wizard};
pub use runtime::{WizardRuntime, WizardServices};
pub use session::{new_session_id, Session, SessionView};
pub use state::{Step, WizardEvent};
