//! Routes chat events to the session, delivery and conversion services.

use std::sync::Arc;

use darkroom_core::{
    CallbackCommand, ChatId, ContentHash, FileToken, InlineAction, MessageId, OwnerId,
    PhoneNumber,
};
use darkroom_delivery::{
    ChatDelivery, CloudDelivery, DeliveryConfig, DeliveryError, DeliveryPipeline,
    DeliveryStrategy, GrayscaleConversion,
};
use darkroom_executor::RetryExecutor;
use darkroom_provider::{ChatChannel, ClientDirectory, CloudStorage};
use darkroom_session::{SessionController, SessionError};
use darkroom_state::StateStore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

use crate::event::{BotCommand, Incoming, MediaKind, Sender};
use crate::texts;

/// External services the dispatcher talks to.
pub struct Collaborators {
    pub channel: Arc<dyn ChatChannel>,
    pub directory: Arc<dyn ClientDirectory>,
    pub storage: Arc<dyn CloudStorage>,
    pub state: Arc<dyn StateStore>,
}

/// Deployment-specific knobs for the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct DispatcherSettings {
    /// Chat that receives files clients send to the bot.
    pub operator_chat: Option<ChatId>,
    /// Sign-up page offered to unknown phone numbers.
    pub register_url: Option<String>,
}

/// Routes [`Incoming`] events.
///
/// Anything that may wait on a remote service for long (phone lookups,
/// deliveries, conversions) is spawned onto a [`TaskTracker`] so the update
/// loop keeps polling. On shutdown cancel the token given to
/// [`with_shutdown`](Self::with_shutdown), then call
/// [`wait_background`](Self::wait_background).
pub struct Dispatcher {
    channel: Arc<dyn ChatChannel>,
    directory: Arc<dyn ClientDirectory>,
    sessions: Arc<SessionController>,
    delivery: DeliveryPipeline,
    chat_delivery: ChatDelivery,
    cloud_delivery: CloudDelivery,
    conversion: GrayscaleConversion,
    executor: RetryExecutor,
    settings: DispatcherSettings,
    background: TaskTracker,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        collaborators: Collaborators,
        sessions: Arc<SessionController>,
        delivery: DeliveryConfig,
        executor: RetryExecutor,
        settings: DispatcherSettings,
    ) -> Self {
        let Collaborators {
            channel,
            directory,
            storage,
            state,
        } = collaborators;

        Self {
            delivery: DeliveryPipeline::new(Arc::clone(&channel), Arc::clone(&state), delivery),
            chat_delivery: ChatDelivery::new(
                Arc::clone(&channel),
                Arc::clone(&state),
                executor.clone(),
            ),
            cloud_delivery: CloudDelivery::new(storage, Arc::clone(&channel), executor.clone()),
            conversion: GrayscaleConversion::new(Arc::clone(&channel), state, executor.clone()),
            channel,
            directory,
            sessions,
            executor,
            settings,
            background: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cut pending phone lookups and delivery waits short once `token` is
    /// cancelled.
    #[must_use]
    pub fn with_shutdown(self, token: CancellationToken) -> Self {
        Self {
            delivery: self.delivery.with_shutdown(token.clone()),
            shutdown: token,
            ..self
        }
    }

    pub fn sessions(&self) -> &Arc<SessionController> {
        &self.sessions
    }

    /// Handle one event. Failures are reported to the client and logged;
    /// nothing propagates to the update loop.
    pub async fn handle(self: &Arc<Self>, event: Incoming) {
        match event {
            Incoming::Command {
                chat,
                sender,
                command,
            } => self.on_command(chat, &sender, command).await,
            Incoming::Text { chat, sender, text } => self.spawn_phone_check(chat, sender.id, text),
            Incoming::Media {
                chat,
                sender,
                kind,
                token,
                caption,
            } => {
                self.forward_media(chat, &sender, kind, &token, caption.as_deref())
                    .await;
            }
            Incoming::Callback {
                id,
                sender,
                chat,
                message,
                data,
                document_name,
            } => {
                self.on_callback(chat, message, sender.id, &data, document_name)
                    .await;
                if let Err(e) = self.channel.answer_callback(&id, None).await {
                    warn!(callback_id = %id, error = %e, "failed to answer callback");
                }
            }
        }
    }

    /// Stop accepting background work and wait for what is running.
    pub async fn wait_background(&self) {
        self.background.close();
        self.background.wait().await;
    }

    async fn on_command(&self, chat: ChatId, sender: &Sender, command: BotCommand) {
        let text = match command {
            BotCommand::Start => texts::START_PROMPT.to_owned(),
            BotCommand::Info => texts::user_info(sender, chat.get()),
        };
        self.reply(chat, &text, &[]).await;
    }

    fn spawn_phone_check(self: &Arc<Self>, chat: ChatId, owner: OwnerId, text: String) {
        let this = Arc::clone(self);
        self.background.spawn(async move {
            tokio::select! {
                () = this.shutdown.cancelled() => debug!(chat = %chat, "phone check abandoned by shutdown"),
                () = this.on_phone(chat, owner, &text) => {}
            }
        });
    }

    #[instrument(skip(self, text), fields(chat = %chat, owner = %owner))]
    async fn on_phone(&self, chat: ChatId, owner: OwnerId, text: &str) {
        let phone = match PhoneNumber::normalize(text) {
            Ok(phone) if CallbackCommand::phone_fits(&phone) => phone,
            _ => {
                debug!("rejected malformed phone number");
                self.reply(chat, texts::INVALID_PHONE, &[]).await;
                return;
            }
        };

        let known = self
            .executor
            .run("check_phone", || self.directory.is_known(&phone))
            .await;
        match known {
            Ok(true) => {
                info!(phone = %phone, "client authorized");
                let start = InlineAction::new(
                    texts::START_SESSION_BUTTON,
                    &CallbackCommand::StartSession(phone),
                );
                self.reply(chat, texts::AUTHORIZED, &[start]).await;
            }
            Ok(false) => {
                info!(phone = %phone, "unknown phone number");
                let text = texts::not_authorized(self.settings.register_url.as_deref());
                self.reply(chat, &text, &[]).await;
            }
            Err(e) => {
                error!(error = %e, "client directory unavailable");
                self.reply(chat, texts::DIRECTORY_UNAVAILABLE, &[]).await;
            }
        }
    }

    async fn forward_media(
        &self,
        chat: ChatId,
        sender: &Sender,
        kind: MediaKind,
        token: &FileToken,
        caption: Option<&str>,
    ) {
        let Some(operator) = self.settings.operator_chat else {
            debug!(chat = %chat, "no operator chat configured, dropping media");
            return;
        };
        let sent = match kind {
            MediaKind::Document => {
                self.channel
                    .send_document_by_token(operator, token, caption)
                    .await
            }
            MediaKind::Photo => self.channel.send_photo_by_token(operator, token, caption).await,
        };
        match sent {
            Ok(_) => info!(from = %sender.id, ?kind, "forwarded media to operator"),
            Err(e) => error!(from = %sender.id, error = %e, "failed to forward media"),
        }
    }

    #[instrument(skip(self, document_name), fields(chat = %chat, owner = %owner))]
    async fn on_callback(
        self: &Arc<Self>,
        chat: ChatId,
        message: MessageId,
        owner: OwnerId,
        data: &str,
        document_name: Option<String>,
    ) {
        let command: CallbackCommand = match data.parse() {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "unrecognized callback data");
                self.reply(chat, texts::UNKNOWN_ACTION, &[]).await;
                return;
            }
        };

        match command {
            CallbackCommand::StartSession(phone) => {
                self.start_session(chat, message, owner, phone).await;
            }
            CallbackCommand::DeliverToChat(_) => {
                self.show_waiting(chat, message, texts::AWAIT_MESSAGE).await;
                self.spawn_delivery(chat, owner, Strategy::Chat);
            }
            CallbackCommand::UploadToCloud(_) => {
                self.show_waiting(chat, message, texts::AWAIT_LINK).await;
                self.spawn_delivery(chat, owner, Strategy::Cloud);
            }
            CallbackCommand::ConvertToGrayscale(hash) => {
                let name = document_name.unwrap_or_else(|| format!("{hash}.jpg"));
                self.spawn_conversion(chat, message, hash, name);
            }
            CallbackCommand::EndSession => {
                let text = match self.sessions.end_session(owner) {
                    Ok(_) => texts::SESSION_ENDED,
                    Err(SessionError::NotOwner) => texts::NOT_SESSION_OWNER,
                    Err(_) => texts::NO_ACTIVE_SESSION,
                };
                self.reply(chat, text, &[]).await;
            }
        }
    }

    async fn start_session(
        &self,
        chat: ChatId,
        message: MessageId,
        owner: OwnerId,
        phone: PhoneNumber,
    ) {
        match self.sessions.try_start(owner, phone.clone()).await {
            Ok(active) => {
                info!(session_id = %active.id(), "session started from chat");
                let actions = [
                    InlineAction::new(
                        texts::DELIVER_TO_CHAT_BUTTON,
                        &CallbackCommand::DeliverToChat(phone.clone()),
                    ),
                    InlineAction::new(
                        texts::UPLOAD_TO_CLOUD_BUTTON,
                        &CallbackCommand::UploadToCloud(phone),
                    ),
                    InlineAction::new(texts::END_SESSION_BUTTON, &CallbackCommand::EndSession),
                ];
                if let Err(e) = self
                    .channel
                    .edit_message(chat, message, texts::TAKE_PHOTOS, &actions)
                    .await
                {
                    warn!(error = %e, "failed to show session controls");
                }
            }
            Err(SessionError::Busy) => {
                info!("start refused, another session is active");
                self.reply(chat, texts::BUSY, &[]).await;
            }
            Err(e) => {
                error!(error = %e, "session start failed");
                self.reply(chat, texts::START_FAILED, &[]).await;
            }
        }
    }

    fn spawn_delivery(self: &Arc<Self>, chat: ChatId, owner: OwnerId, strategy: Strategy) {
        let this = Arc::clone(self);
        self.background.spawn(async move {
            let strategy: &dyn DeliveryStrategy = match strategy {
                Strategy::Chat => &this.chat_delivery,
                Strategy::Cloud => &this.cloud_delivery,
            };
            match this.delivery.run_for_owner(strategy, chat, owner).await {
                Ok(report) => info!(
                    strategy = strategy.name(),
                    delivered = report.delivered,
                    discarded = report.discarded,
                    outcome = ?report.outcome,
                    "delivery finished"
                ),
                Err(e) => error!(strategy = strategy.name(), error = %e, "delivery failed"),
            }
        });
    }

    fn spawn_conversion(
        self: &Arc<Self>,
        chat: ChatId,
        message: MessageId,
        hash: ContentHash,
        name: String,
    ) {
        let this = Arc::clone(self);
        self.background.spawn(async move {
            match this.conversion.convert(chat, message, &hash, &name).await {
                Ok(_) => {}
                Err(DeliveryError::UnknownHash(_)) => {
                    warn!(hash = %hash, "conversion requested for unknown photo");
                    this.reply(chat, texts::PHOTO_UNAVAILABLE, &[]).await;
                }
                Err(e) => {
                    error!(hash = %hash, error = %e, "conversion failed");
                    this.reply(chat, texts::CONVERSION_FAILED, &[]).await;
                }
            }
        });
    }

    async fn reply(&self, chat: ChatId, text: &str, actions: &[InlineAction]) {
        if let Err(e) = self.channel.send_message(chat, text, actions).await {
            warn!(chat = %chat, error = %e, "failed to send reply");
        }
    }

    /// Replace the session controls with `text`, keeping only the button
    /// that ends the session.
    async fn show_waiting(&self, chat: ChatId, message: MessageId, text: &str) {
        let end = [InlineAction::new(
            texts::END_SESSION_BUTTON,
            &CallbackCommand::EndSession,
        )];
        if let Err(e) = self.channel.edit_message(chat, message, text, &end).await {
            warn!(chat = %chat, error = %e, "failed to edit message");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Strategy {
    Chat,
    Cloud,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use darkroom_delivery::notice;
    use darkroom_executor::{ExecutorConfig, RetryStrategy};
    use darkroom_provider::testing::{
        ChannelCall, MemoryCloudStorage, RecordingChannel, StaticDirectory,
    };
    use darkroom_session::SessionConfig;
    use darkroom_state::put_file_token;
    use darkroom_state_memory::MemoryStateStore;
    use tempfile::TempDir;

    use super::*;

    const CHAT: ChatId = ChatId::new(100);
    const OWNER: OwnerId = OwnerId::new(7);
    const MSG: MessageId = MessageId::new(55);

    struct Harness {
        dispatcher: Arc<Dispatcher>,
        channel: Arc<RecordingChannel>,
        storage: Arc<MemoryCloudStorage>,
        state: Arc<MemoryStateStore>,
        root: TempDir,
    }

    fn phone() -> PhoneNumber {
        PhoneNumber::normalize("+79161234567").unwrap()
    }

    fn sender(id: OwnerId) -> Sender {
        Sender {
            id,
            first_name: "Ann".into(),
            last_name: Some("Lee".into()),
            username: Some("ann".into()),
            language_code: Some("en".into()),
        }
    }

    fn harness(settings: DispatcherSettings) -> Harness {
        harness_with(settings, Arc::new(StaticDirectory::new([phone()])))
    }

    fn harness_with(settings: DispatcherSettings, directory: Arc<dyn ClientDirectory>) -> Harness {
        let root = tempfile::tempdir().unwrap();
        let watch = root.path().join("photo");
        std::fs::create_dir_all(&watch).unwrap();

        let channel = Arc::new(RecordingChannel::new());
        let storage = Arc::new(MemoryCloudStorage::new());
        let state = Arc::new(MemoryStateStore::new());
        let sessions = Arc::new(SessionController::new(
            SessionConfig::new(&watch, root.path().join("clients")),
            state.clone(),
        ));
        let executor = RetryExecutor::new(ExecutorConfig {
            max_attempts: 2,
            retry_strategy: RetryStrategy::Constant {
                delay: Duration::from_millis(1),
            },
        });
        let delivery = DeliveryConfig {
            check_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(20),
            ..DeliveryConfig::default()
        };
        let dispatcher = Dispatcher::new(
            Collaborators {
                channel: channel.clone(),
                directory,
                storage: storage.clone(),
                state: state.clone(),
            },
            sessions,
            delivery,
            executor,
            settings,
        );
        Harness {
            dispatcher: Arc::new(dispatcher),
            channel,
            storage,
            state,
            root,
        }
    }

    fn text(body: &str) -> Incoming {
        Incoming::Text {
            chat: CHAT,
            sender: sender(OWNER),
            text: body.into(),
        }
    }

    fn callback(owner: OwnerId, command: &CallbackCommand) -> Incoming {
        Incoming::Callback {
            id: "cb-1".into(),
            sender: sender(owner),
            chat: CHAT,
            message: MSG,
            data: command.to_string(),
            document_name: None,
        }
    }

    #[tokio::test]
    async fn start_command_asks_for_phone() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(Incoming::Command {
                chat: CHAT,
                sender: sender(OWNER),
                command: BotCommand::Start,
            })
            .await;
        assert_eq!(h.channel.sent_texts(), vec![texts::START_PROMPT.to_owned()]);
    }

    #[tokio::test]
    async fn info_command_echoes_identity() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(Incoming::Command {
                chat: CHAT,
                sender: sender(OWNER),
                command: BotCommand::Info,
            })
            .await;
        let reply = &h.channel.sent_texts()[0];
        assert!(reply.contains("First name: Ann"));
        assert!(reply.contains("Username: @ann"));
        assert!(reply.contains("Chat ID: 100"));
    }

    #[tokio::test]
    async fn known_phone_is_offered_a_session() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher.handle(text("89161234567")).await;
        h.dispatcher.wait_background().await;

        let calls = h.channel.calls();
        let ChannelCall::SendMessage { text, actions, .. } = &calls[0] else {
            panic!("expected a message, got {calls:?}");
        };
        assert_eq!(text, texts::AUTHORIZED);
        assert_eq!(
            actions,
            &vec![InlineAction::new(
                texts::START_SESSION_BUTTON,
                &CallbackCommand::StartSession(phone())
            )]
        );
    }

    #[tokio::test]
    async fn unknown_phone_gets_signup_link() {
        let h = harness(DispatcherSettings {
            register_url: Some("https://example.test/book".into()),
            ..DispatcherSettings::default()
        });
        h.dispatcher.handle(text("+79990000000")).await;
        h.dispatcher.wait_background().await;
        let reply = &h.channel.sent_texts()[0];
        assert!(reply.starts_with("Authorization failed"));
        assert!(reply.ends_with("https://example.test/book"));
    }

    #[tokio::test]
    async fn malformed_phone_is_rejected() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher.handle(text("hello")).await;
        h.dispatcher.wait_background().await;
        assert_eq!(h.channel.sent_texts(), vec![texts::INVALID_PHONE.to_owned()]);
    }

    #[tokio::test]
    async fn phone_too_long_for_a_button_is_rejected() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(text(&format!("+7{}", "0".repeat(60))))
            .await;
        h.dispatcher.wait_background().await;
        assert_eq!(h.channel.sent_texts(), vec![texts::INVALID_PHONE.to_owned()]);
    }

    /// Directory that answers only after `release` gets a permit.
    struct StalledDirectory {
        release: tokio::sync::Semaphore,
    }

    #[async_trait::async_trait]
    impl ClientDirectory for StalledDirectory {
        async fn list_known_phone_numbers(
            &self,
        ) -> Result<std::collections::HashSet<PhoneNumber>, darkroom_provider::ProviderError>
        {
            let _permit = self.release.acquire().await;
            Ok([phone()].into())
        }
    }

    #[tokio::test]
    async fn slow_phone_lookup_does_not_hold_up_other_updates() {
        let directory = Arc::new(StalledDirectory {
            release: tokio::sync::Semaphore::new(0),
        });
        let h = harness_with(DispatcherSettings::default(), directory.clone());

        tokio::time::timeout(Duration::from_secs(1), h.dispatcher.handle(text("89161234567")))
            .await
            .expect("phone check should not block the handler");
        h.dispatcher
            .handle(Incoming::Command {
                chat: CHAT,
                sender: sender(OWNER),
                command: BotCommand::Start,
            })
            .await;
        assert_eq!(h.channel.sent_texts(), vec![texts::START_PROMPT.to_owned()]);

        directory.release.add_permits(1);
        h.dispatcher.wait_background().await;
        assert_eq!(
            h.channel.sent_texts(),
            vec![texts::START_PROMPT.to_owned(), texts::AUTHORIZED.to_owned()]
        );
    }

    #[tokio::test]
    async fn shutdown_abandons_pending_phone_lookup() {
        let directory = Arc::new(StalledDirectory {
            release: tokio::sync::Semaphore::new(0),
        });
        let h = harness_with(DispatcherSettings::default(), directory);
        let shutdown = CancellationToken::new();
        let dispatcher = Arc::new(
            Arc::into_inner(h.dispatcher)
                .expect("no other handles yet")
                .with_shutdown(shutdown.clone()),
        );

        dispatcher.handle(text("89161234567")).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), dispatcher.wait_background())
            .await
            .expect("background work should stop on shutdown");
        assert!(h.channel.sent_texts().is_empty());
    }

    #[tokio::test]
    async fn start_callback_starts_session_and_shows_controls() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::StartSession(phone())))
            .await;

        let active = h.dispatcher.sessions().current().unwrap();
        assert_eq!(active.owner_id(), OWNER);
        assert!(active.destination_folder().starts_with(h.root.path()));

        let calls = h.channel.calls();
        let ChannelCall::EditMessage {
            message,
            text,
            actions,
            ..
        } = &calls[0]
        else {
            panic!("expected an edit, got {calls:?}");
        };
        assert_eq!(*message, MSG);
        assert_eq!(text, texts::TAKE_PHOTOS);
        assert_eq!(actions.len(), 3);
        assert!(matches!(
            &calls[1],
            ChannelCall::AnswerCallback { callback_id, .. } if callback_id == "cb-1"
        ));
        h.dispatcher.sessions().stop();
    }

    #[tokio::test]
    async fn second_start_is_refused_while_busy() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::StartSession(phone())))
            .await;
        h.dispatcher
            .handle(callback(
                OwnerId::new(8),
                &CallbackCommand::StartSession(phone()),
            ))
            .await;

        assert!(h.channel.sent_texts().contains(&texts::BUSY.to_owned()));
        assert_eq!(
            h.dispatcher.sessions().current().unwrap().owner_id(),
            OWNER
        );
        h.dispatcher.sessions().stop();
    }

    #[tokio::test]
    async fn only_owner_can_end_session() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::StartSession(phone())))
            .await;

        h.dispatcher
            .handle(callback(OwnerId::new(8), &CallbackCommand::EndSession))
            .await;
        assert!(h.dispatcher.sessions().is_busy());

        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::EndSession))
            .await;
        assert!(!h.dispatcher.sessions().is_busy());

        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::EndSession))
            .await;

        let texts_sent = h.channel.sent_texts();
        assert!(texts_sent.contains(&texts::NOT_SESSION_OWNER.to_owned()));
        assert!(texts_sent.contains(&texts::SESSION_ENDED.to_owned()));
        assert!(texts_sent.contains(&texts::NO_ACTIVE_SESSION.to_owned()));
    }

    #[tokio::test]
    async fn waiting_message_keeps_end_session_button() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::StartSession(phone())))
            .await;
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::DeliverToChat(phone())))
            .await;

        let end = InlineAction::new(texts::END_SESSION_BUTTON, &CallbackCommand::EndSession);
        assert!(h.channel.calls().contains(&ChannelCall::EditMessage {
            chat: CHAT,
            message: MSG,
            text: texts::AWAIT_MESSAGE.to_owned(),
            actions: vec![end],
        }));

        // The kept button still ends the session while delivery runs.
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::EndSession))
            .await;
        assert!(!h.dispatcher.sessions().is_busy());
        h.dispatcher.wait_background().await;
    }

    #[tokio::test]
    async fn deliver_without_record_reports_no_photos() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::DeliverToChat(phone())))
            .await;
        h.dispatcher.wait_background().await;

        assert_eq!(
            h.channel.sent_texts(),
            vec![texts::AWAIT_MESSAGE.to_owned(), notice::NO_PHOTOS.to_owned()]
        );
    }

    #[tokio::test]
    async fn cloud_upload_runs_in_background() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::StartSession(phone())))
            .await;
        let dest = h
            .dispatcher
            .sessions()
            .current()
            .unwrap()
            .destination_folder()
            .to_path_buf();
        h.dispatcher.sessions().stop();
        std::fs::write(dest.join("a.jpg"), b"jpeg").unwrap();

        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::UploadToCloud(phone())))
            .await;
        h.dispatcher.wait_background().await;

        assert_eq!(
            h.storage.uploaded_paths(),
            vec!["disk:/+79161234567/a.jpg".to_owned()]
        );
        let sent = h.channel.sent_texts();
        assert!(sent.contains(&texts::AWAIT_LINK.to_owned()));
        assert!(sent.iter().any(|t| t.contains("https://disk.test/d/")));
        assert!(!dest.join("a.jpg").exists());
    }

    #[tokio::test]
    async fn grayscale_for_unknown_photo_is_reported() {
        let h = harness(DispatcherSettings::default());
        let hash = ContentHash::of(&FileToken::new("missing"));
        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::ConvertToGrayscale(hash)))
            .await;
        h.dispatcher.wait_background().await;
        assert_eq!(
            h.channel.sent_texts(),
            vec![texts::PHOTO_UNAVAILABLE.to_owned()]
        );
    }

    #[tokio::test]
    async fn grayscale_fetch_failure_is_reported() {
        let h = harness(DispatcherSettings::default());
        let token = FileToken::new("file-9");
        let hash = ContentHash::of(&token);
        put_file_token(h.state.as_ref(), &hash, &token).await.unwrap();
        h.channel
            .fail_fetches([darkroom_provider::ProviderError::Api {
                status: 400,
                body: "bad file".into(),
            }]);

        h.dispatcher
            .handle(callback(OWNER, &CallbackCommand::ConvertToGrayscale(hash)))
            .await;
        h.dispatcher.wait_background().await;
        assert_eq!(
            h.channel.sent_texts(),
            vec![texts::CONVERSION_FAILED.to_owned()]
        );
    }

    #[tokio::test]
    async fn stale_button_gets_unknown_action() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(Incoming::Callback {
                id: "cb-2".into(),
                sender: sender(OWNER),
                chat: CHAT,
                message: MSG,
                data: "launch_rockets".into(),
                document_name: None,
            })
            .await;
        let calls = h.channel.calls();
        assert_eq!(h.channel.sent_texts(), vec![texts::UNKNOWN_ACTION.to_owned()]);
        assert!(matches!(calls.last(), Some(ChannelCall::AnswerCallback { .. })));
    }

    #[tokio::test]
    async fn media_is_forwarded_to_operator() {
        let h = harness(DispatcherSettings {
            operator_chat: Some(ChatId::new(-500)),
            ..DispatcherSettings::default()
        });
        h.dispatcher
            .handle(Incoming::Media {
                chat: CHAT,
                sender: sender(OWNER),
                kind: MediaKind::Photo,
                token: FileToken::new("ph-1"),
                caption: Some("look".into()),
            })
            .await;
        assert_eq!(
            h.channel.calls(),
            vec![ChannelCall::SendPhotoByToken {
                chat: ChatId::new(-500),
                token: FileToken::new("ph-1"),
            }]
        );
    }

    #[tokio::test]
    async fn media_without_operator_is_dropped() {
        let h = harness(DispatcherSettings::default());
        h.dispatcher
            .handle(Incoming::Media {
                chat: CHAT,
                sender: sender(OWNER),
                kind: MediaKind::Document,
                token: FileToken::new("doc-1"),
                caption: None,
            })
            .await;
        assert!(h.channel.calls().is_empty());
    }
}
