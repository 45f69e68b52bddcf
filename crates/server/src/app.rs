//! Wires the configured adapters together and runs the update loop.

use std::sync::Arc;
use std::time::Duration;

use darkroom_core::ChatId;
use darkroom_executor::RetryExecutor;
use darkroom_session::{SessionConfig, SessionController};
use darkroom_telegram::{TelegramChannel, TelegramConfig, UpdatePoller};
use darkroom_yadisk::{YandexDiskConfig, YandexDiskStorage};
use darkroom_yclients::{YClientsConfig, YClientsDirectory};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{DarkroomConfig, secret_value};
use crate::dispatcher::{Collaborators, Dispatcher, DispatcherSettings};
use crate::error::ServerError;
use crate::event::Incoming;
use crate::state_factory::create_state;

/// Pause after a failed `getUpdates` call before polling again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// The running bot: one Telegram long-poll loop feeding a [`Dispatcher`].
pub struct App {
    channel: Arc<TelegramChannel>,
    dispatcher: Arc<Dispatcher>,
    /// Cancelled once the update loop exits so background work stops waiting.
    stopping: CancellationToken,
}

impl App {
    /// Build every adapter from `config`. Nothing talks to the network yet.
    ///
    /// # Errors
    ///
    /// Fails if the state backend cannot be opened or the watch folder
    /// cannot be created.
    pub async fn build(config: &DarkroomConfig) -> Result<Self, ServerError> {
        let channel = Arc::new(TelegramChannel::new(telegram_config(config)));
        let storage = Arc::new(YandexDiskStorage::new(disk_config(config)));
        let directory = Arc::new(YClientsDirectory::new(yclients_config(config)?));
        let state = create_state(&config.state).await?;

        tokio::fs::create_dir_all(&config.folders.watch).await?;
        let sessions = Arc::new(SessionController::new(
            session_config(config),
            Arc::clone(&state),
        ));

        let stopping = CancellationToken::new();
        let settings = DispatcherSettings {
            operator_chat: config.telegram.operator_chat_id.map(ChatId::new),
            register_url: config.telegram.register_url.clone(),
        };
        let dispatcher = Dispatcher::new(
            Collaborators {
                channel: channel.clone(),
                directory,
                storage,
                state,
            },
            sessions,
            config.delivery.to_config(),
            RetryExecutor::new(config.retry.to_executor_config()),
            settings,
        )
        .with_shutdown(stopping.clone());

        info!(
            watch = %config.folders.watch.display(),
            clients = %config.folders.clients.display(),
            state = %config.state.backend,
            "darkroom ready"
        );
        Ok(Self {
            channel,
            dispatcher: Arc::new(dispatcher),
            stopping,
        })
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Poll for updates and dispatch them until `shutdown` is cancelled.
    ///
    /// On shutdown the active session is stopped. Running deliveries stop
    /// waiting for new files and pending phone lookups are dropped; the
    /// call returns once that background work has wound down.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut poller = UpdatePoller::new(Arc::clone(&self.channel));
        info!("polling for updates");

        loop {
            let batch = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                batch = poller.next_batch() => batch,
            };

            match batch {
                Ok(updates) => {
                    for update in updates {
                        let update_id = update.update_id;
                        match Incoming::from_update(update) {
                            Some(event) => self.dispatcher.handle(event).await,
                            None => debug!(update_id, "ignoring update"),
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to fetch updates");
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                    }
                }
            }
        }

        info!("shutting down");
        if self.dispatcher.sessions().stop() {
            warn!("active session stopped by shutdown");
        }
        self.stopping.cancel();
        self.dispatcher.wait_background().await;
    }
}

fn telegram_config(config: &DarkroomConfig) -> TelegramConfig {
    let section = &config.telegram;
    let mut telegram = TelegramConfig::new(secret_value(section.bot_token.as_ref()))
        .with_poll_timeout(section.poll_timeout_seconds)
        .with_request_timeout(Duration::from_secs(section.request_timeout_seconds));
    if let Some(url) = &section.api_base_url {
        telegram = telegram.with_api_base_url(url);
    }
    telegram
}

fn disk_config(config: &DarkroomConfig) -> YandexDiskConfig {
    let section = &config.disk;
    let mut disk = YandexDiskConfig::new(secret_value(section.oauth_token.as_ref()));
    if let Some(url) = &section.api_base_url {
        disk = disk.with_api_base_url(url);
    }
    if let Some(secs) = section.upload_timeout_seconds {
        disk = disk.with_upload_timeout(Duration::from_secs(secs));
    }
    disk
}

fn yclients_config(config: &DarkroomConfig) -> Result<YClientsConfig, ServerError> {
    let section = &config.yclients;
    let company_id = section
        .company_id
        .ok_or_else(|| ServerError::Config("yclients.company_id is required".into()))?;
    let mut yclients = YClientsConfig::new(
        secret_value(section.partner_token.as_ref()),
        secret_value(section.user_token.as_ref()),
        company_id,
    );
    if let Some(url) = &section.api_base_url {
        yclients = yclients.with_api_base_url(url);
    }
    if let Some(size) = section.page_size {
        yclients = yclients.with_page_size(size);
    }
    Ok(yclients)
}

fn session_config(config: &DarkroomConfig) -> SessionConfig {
    SessionConfig::new(&config.folders.watch, &config.folders.clients)
        .with_idle_timeout(config.session.timeout())
        .with_idle_check_interval(config.session.idle_check_interval())
        .with_settle(config.ingest.settle())
        .with_quality(config.ingest.policy())
}
