//! Starting, timing out and ending the active session.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use darkroom_core::{ClientFolderRecord, OwnerId, PhoneNumber, Session};
use darkroom_ingest::{
    FileEvent, FileSink, FolderWatcher, ImageQualityFilter, IngestOutcome, IngestPipeline,
};
use darkroom_state::{StateStore, put_client_folder};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::monitor::run_idle_monitor;
use crate::registry::SessionRegistry;

/// A running session: the immutable [`Session`] plus its live state.
pub struct ActiveSession {
    session: Session,
    last_accepted_ms: AtomicI64,
    watcher: FolderWatcher,
    stopped: CancellationToken,
}

impl ActiveSession {
    pub(crate) fn new(session: Session) -> Self {
        let watcher = FolderWatcher::new(&session.watch_folder);
        let last_accepted_ms = AtomicI64::new(session.started_at.timestamp_millis());
        Self {
            session,
            last_accepted_ms,
            watcher,
            stopped: CancellationToken::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn id(&self) -> Uuid {
        self.session.id
    }

    pub fn owner_id(&self) -> OwnerId {
        self.session.owner_id
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.session.phone
    }

    pub fn destination_folder(&self) -> &Path {
        &self.session.destination_folder
    }

    /// When the last photo was accepted, or the start time if none was.
    pub fn last_accepted_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_accepted_ms.load(Ordering::Acquire))
            .unwrap_or(self.session.started_at)
    }

    /// Record a photo accepted at `at`. Never moves the timestamp backwards.
    pub fn touch(&self, at: DateTime<Utc>) {
        self.last_accepted_ms
            .fetch_max(at.timestamp_millis(), Ordering::AcqRel);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_cancelled()
    }

    /// Resolves once the session has been stopped.
    pub async fn stopped(&self) {
        self.stopped.cancelled().await;
    }

    fn stop(&self) {
        self.watcher.stop();
        self.stopped.cancel();
    }
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("id", &self.session.id)
            .field("owner_id", &self.session.owner_id)
            .field("phone", &self.session.phone)
            .field("last_accepted_at", &self.last_accepted_at())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Feeds watcher events through the ingest pipeline and keeps the session's
/// activity timestamp current.
struct SessionSink {
    pipeline: IngestPipeline,
    session: Weak<ActiveSession>,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl FileSink for SessionSink {
    async fn on_event(&self, event: FileEvent) {
        let FileEvent::Appeared(path) = event;
        match self.pipeline.process(&path).await {
            Ok(IngestOutcome::Accepted(_)) => {
                if let Some(session) = self.session.upgrade() {
                    session.touch(self.clock.now());
                }
            }
            Ok(_) => {}
            Err(e) => error!(path = %path.display(), error = %e, "ingest failed"),
        }
    }
}

/// Owns the session slot and the lifecycle of the session in it.
pub struct SessionController {
    config: SessionConfig,
    registry: SessionRegistry,
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
}

impl SessionController {
    pub fn new(config: SessionConfig, state: Arc<dyn StateStore>) -> Self {
        Self::with_clock(config, state, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: SessionConfig,
        state: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
            state,
            clock,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current(&self) -> Option<Arc<ActiveSession>> {
        self.registry.current()
    }

    pub fn is_busy(&self) -> bool {
        self.registry.is_busy()
    }

    /// Start a session for `phone` on behalf of `owner`.
    ///
    /// Records the owner's destination folder, creates it, starts watching
    /// the capture folder and arms the idle timer. If any step fails the
    /// slot is released again.
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] if a session is already active; otherwise the
    /// error of the failing step.
    #[instrument(skip(self), fields(owner = %owner, phone = %phone))]
    pub async fn try_start(
        self: &Arc<Self>,
        owner: OwnerId,
        phone: PhoneNumber,
    ) -> Result<Arc<ActiveSession>, SessionError> {
        let session = Session::new(
            owner,
            phone,
            &self.config.watch_folder,
            &self.config.clients_root,
            self.clock.now(),
        );
        let active = Arc::new(ActiveSession::new(session));
        self.registry.try_acquire(Arc::clone(&active))?;

        if let Err(e) = self.prepare(&active).await {
            warn!(error = %e, "session start failed, releasing slot");
            self.registry.release(active.id());
            active.stop();
            return Err(e);
        }

        tokio::spawn(run_idle_monitor(
            Arc::downgrade(self),
            Arc::clone(&active),
            self.config.idle_check_interval,
        ));
        info!(
            session_id = %active.id(),
            dest = %active.destination_folder().display(),
            "session started"
        );
        Ok(active)
    }

    async fn prepare(&self, active: &Arc<ActiveSession>) -> Result<(), SessionError> {
        let session = active.session();
        let record = ClientFolderRecord::new(
            session.owner_id,
            session.phone.clone(),
            session.destination_folder.clone(),
        );
        put_client_folder(self.state.as_ref(), &record).await?;
        tokio::fs::create_dir_all(&session.destination_folder).await?;

        let pipeline = IngestPipeline::new(
            &session.destination_folder,
            ImageQualityFilter::new(self.config.quality),
        )
        .with_settle(self.config.settle);
        let sink = SessionSink {
            pipeline,
            session: Arc::downgrade(active),
            clock: Arc::clone(&self.clock),
        };
        active.watcher.start(Arc::new(sink))?;
        Ok(())
    }

    /// End the active session if it has been idle for the configured
    /// timeout. Returns `true` if it was ended.
    pub fn check_idle(&self) -> bool {
        self.registry
            .current()
            .is_some_and(|active| self.expire_if_idle(&active))
    }

    pub(crate) fn expire_if_idle(&self, active: &ActiveSession) -> bool {
        let idle = self.clock.now() - active.last_accepted_at();
        let timeout =
            chrono::Duration::from_std(self.config.idle_timeout).unwrap_or(chrono::Duration::MAX);
        if idle < timeout {
            return false;
        }
        if self.registry.release(active.id()) {
            info!(
                session_id = %active.id(),
                idle_secs = idle.num_seconds(),
                "session timed out"
            );
        }
        active.stop();
        true
    }

    /// Stop the active session, whoever owns it. Returns whether one was
    /// running.
    pub fn stop(&self) -> bool {
        let Some(active) = self.registry.current() else {
            return false;
        };
        self.registry.release(active.id());
        active.stop();
        info!(session_id = %active.id(), "session stopped");
        true
    }

    /// Stop the active session on request of its owner.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotActive`] if nothing is running,
    /// [`SessionError::NotOwner`] if `owner` did not start it.
    pub fn end_session(&self, owner: OwnerId) -> Result<Arc<ActiveSession>, SessionError> {
        let active = self.registry.current().ok_or(SessionError::NotActive)?;
        if active.owner_id() != owner {
            return Err(SessionError::NotOwner);
        }
        self.registry.release(active.id());
        active.stop();
        info!(session_id = %active.id(), owner = %owner, "session ended by owner");
        Ok(active)
    }
}
