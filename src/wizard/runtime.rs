//! Drives sessions: applies events under the session lock, then runs the
//! resulting effects on the tokio runtime.

use super::controller::{Effect, GenerationJob, Wizard};
use super::session::{new_session_id, now_millis, Session, SessionView};
use super::state::WizardEvent;
use crate::archetype::ArchetypeDeriver;
use crate::background::TaskSpawner;
use crate::collaborators::{EmailRelay, ObjectStore, SubmissionSink};
use crate::error::ApiError;
use crate::generation::GenerationOrchestrator;
use crate::quiz::QuestionCatalog;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Collaborators used while driving sessions
#[derive(Clone)]
pub struct WizardServices {
    pub deriver: ArchetypeDeriver,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub sink: Arc<dyn SubmissionSink>,
    /// Stores inline results once, so later submissions reuse the URL
    pub store: Option<Arc<dyn ObjectStore>>,
    pub email: Option<Arc<dyn EmailRelay>>,
    pub spawner: TaskSpawner,
}

type SharedSession = Arc<Mutex<Session>>;

pub struct WizardRuntime {
    wizard: Wizard,
    services: WizardServices,
    sessions: RwLock<HashMap<String, SharedSession>>,
    session_ttl: Duration,
}

impl WizardRuntime {
    pub fn new(wizard: Wizard, services: WizardServices, session_ttl: Duration) -> Self {
        Self {
            wizard,
            services,
            sessions: RwLock::new(HashMap::new()),
            session_ttl,
        }
    }

    pub fn catalog(&self) -> &Arc<QuestionCatalog> {
        self.wizard.catalog()
    }

    pub fn services(&self) -> &WizardServices {
        &self.services
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn create_session(&self) -> SessionView {
        self.prune_expired();
        let session = Session::new(new_session_id());
        let view = session.view(self.catalog());
        info!(session = %session.id, "session created");
        self.sessions
            .write()
            .insert(session.id.clone(), Arc::new(Mutex::new(session)));
        view
    }

    pub fn view(&self, session_id: &str) -> Result<SessionView, ApiError> {
        let session = self.session(session_id)?;
        let guard = session.lock();
        Ok(guard.view(self.catalog()))
    }

    /// Drop a session. Any generation still running for it is discarded.
    pub fn discard(&self, session_id: &str) -> Result<(), ApiError> {
        let session = self
            .sessions
            .write()
            .remove(session_id)
            .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
        session.lock().reset();
        info!(session = %session_id, "session discarded");
        Ok(())
    }

    /// Apply one event and start any async work it requires.
    ///
    /// Returns the session as it stands after the event. Generation runs in the
    /// background; the session reports `generating` until it completes.
    pub async fn dispatch(
        &self,
        session_id: &str,
        event: WizardEvent,
    ) -> Result<SessionView, ApiError> {
        let session = self.session(session_id)?;
        let (effect, view) = {
            let mut guard = session.lock();
            let effect = self.wizard.apply(&mut guard, event)?;
            (effect, guard.view(self.catalog()))
        };
        self.run_effect(&session, effect);
        Ok(view)
    }

    /// Wait for background work started so far (generation and side effects).
    pub async fn settle(&self) {
        self.services.spawner.drain().await;
    }

    fn session(&self, session_id: &str) -> Result<SharedSession, ApiError> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))
    }

    fn run_effect(&self, session: &SharedSession, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Generate(job) => self.spawn_generation(session.clone(), job),
            other => dispatch_side_effect(&self.services, other),
        }
    }

    fn spawn_generation(&self, session: SharedSession, job: GenerationJob) {
        let wizard = self.wizard.clone();
        let services = self.services.clone();
        debug!(session = %job.session_id, epoch = job.epoch, "generation started");
        self.services.spawner.spawn("generation", async move {
            let archetype = services.deriver.derive(&job.answers).await;
            let mut result = services
                .orchestrator
                .generate(archetype, &job.answers, job.photo)
                .await;
            if let (Some(store), Some(inline)) = (&services.store, result.image.as_inline()) {
                match store.upload(inline).await {
                    Ok(url) => result.image_url = Some(url),
                    Err(err) => {
                        warn!(session = %job.session_id, error = %err, "result image upload failed")
                    }
                }
            }
            let follow_up = {
                let mut guard = session.lock();
                wizard.complete_generation(&mut guard, job.epoch, result)
            };
            if let Some(effect) = follow_up {
                dispatch_side_effect(&services, effect);
            }
            Ok(())
        });
    }

    fn prune_expired(&self) {
        let ttl_ms = self.session_ttl.as_millis() as u64;
        if ttl_ms == 0 {
            return;
        }
        let cutoff = now_millis().saturating_sub(ttl_ms);
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.lock().updated_at_ms >= cutoff);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "expired sessions pruned");
        }
    }
}

fn dispatch_side_effect(services: &WizardServices, effect: Effect) {
    match effect {
        Effect::Submit(summary) => {
            let sink = services.sink.clone();
            services
                .spawner
                .spawn("submission", async move { sink.submit(summary).await });
        }
        Effect::Email(message) => match &services.email {
            Some(relay) => {
                let relay = relay.clone();
                services
                    .spawner
                    .spawn("email", async move { relay.send(message).await });
            }
            None => warn!("email requested but no relay is configured"),
        },
        Effect::None | Effect::Generate(_) => {}
    }
}
