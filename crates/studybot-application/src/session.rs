//! Conversation session orchestration.
//!
//! `ConversationSession` owns the message history of one chat widget and
//! drives the reply pipeline: validate the submission, plan the reply with
//! the shared `ReplyComposer`, and reveal it through a `StreamScheduler`.
//! Every transition publishes a `SessionSnapshot` for renderers.

use crate::scheduler::StreamScheduler;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use studybot_core::Result;
use studybot_core::assistant::{ProviderLabel, ReplyComposer, TopicKey, quick_prompts};
use studybot_core::config::{AssistantConfig, SessionTexts};
use studybot_core::session::{
    ChatMessage, RejectReason, SessionSnapshot, StreamState, SubmitOutcome,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use uuid::Uuid;

/// Mutable session data. Only ever touched under the session mutex.
struct SessionState {
    id: String,
    composer: Arc<ReplyComposer>,
    texts: SessionTexts,
    /// Raw navigation context as last reported by the host.
    context: String,
    topic: TopicKey,
    provider: ProviderLabel,
    messages: Vec<ChatMessage>,
    stream_state: StreamState,
    /// Assistant message currently written by the scheduler.
    streaming_reply: Option<Uuid>,
    unread: bool,
    foreground: bool,
    scheduler: StreamScheduler,
    publisher: watch::Sender<SessionSnapshot>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            messages: self.messages.clone(),
            stream_state: self.stream_state,
            unread: self.unread,
            provider: self.provider,
            topic: self.topic.clone(),
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }

    /// Stops the in-flight reveal, leaving the partial content as is.
    fn cancel_stream(&mut self) -> bool {
        let had_stream = self.streaming_reply.take().is_some();
        self.scheduler.cancel();
        self.stream_state = StreamState::Idle;
        had_stream
    }

    fn reply_mut(&mut self, reply_id: Uuid) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().rev().find(|m| m.id == reply_id)
    }
}

/// One conversation: message history, stream state and unread flag.
///
/// Sessions start in the foreground with a single greeting message. All
/// methods are synchronous and return immediately; replies are revealed by
/// a background task on the Tokio runtime the session was created on.
/// Dropping the session (or calling [`teardown`](Self::teardown)) cancels any
/// active reveal.
pub struct ConversationSession {
    state: Arc<Mutex<SessionState>>,
}

impl ConversationSession {
    /// Creates a session on the current Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `composer` - Shared reply selection components
    /// * `config` - Stream timing and session texts
    /// * `context` - Initial raw navigation context (may be empty)
    ///
    /// # Errors
    ///
    /// Returns a runtime error when called outside a Tokio runtime.
    pub fn new(
        composer: Arc<ReplyComposer>,
        config: &AssistantConfig,
        context: impl Into<String>,
    ) -> Result<Self> {
        let scheduler = StreamScheduler::new(&config.stream)?;
        Ok(Self::with_scheduler(composer, config, context, scheduler))
    }

    /// Creates a session whose reveals run on `runtime`.
    pub fn with_handle(
        composer: Arc<ReplyComposer>,
        config: &AssistantConfig,
        context: impl Into<String>,
        runtime: Handle,
    ) -> Self {
        let scheduler = StreamScheduler::with_handle(&config.stream, runtime);
        Self::with_scheduler(composer, config, context, scheduler)
    }

    fn with_scheduler(
        composer: Arc<ReplyComposer>,
        config: &AssistantConfig,
        context: impl Into<String>,
        scheduler: StreamScheduler,
    ) -> Self {
        let context = context.into();
        let topic = composer.resolve_topic(&context);
        let id = Uuid::new_v4().to_string();
        let messages = vec![ChatMessage::assistant(config.texts.greeting.clone())];

        let initial = SessionSnapshot {
            session_id: id.clone(),
            messages: messages.clone(),
            stream_state: StreamState::Idle,
            unread: false,
            provider: ProviderLabel::Primary,
            topic: topic.clone(),
        };
        let (publisher, _) = watch::channel(initial);

        tracing::info!("[Session] Created session {} (topic: {})", id, topic);

        Self {
            state: Arc::new(Mutex::new(SessionState {
                id,
                composer,
                texts: config.texts.clone(),
                context,
                topic,
                provider: ProviderLabel::Primary,
                messages,
                stream_state: StreamState::Idle,
                streaming_reply: None,
                unread: false,
                foreground: true,
                scheduler,
                publisher,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    /// Submits user text and starts revealing the reply.
    ///
    /// Empty or whitespace-only text and submissions while a reply is still
    /// streaming are rejected without touching the session.
    pub fn submit(&self, text: &str) -> SubmitOutcome {
        let mut state = self.lock();

        let question = text.trim();
        if question.is_empty() {
            tracing::debug!("[Session] Ignoring empty submission");
            return SubmitOutcome::Rejected(RejectReason::EmptyInput);
        }
        if state.stream_state == StreamState::Streaming {
            tracing::debug!("[Session] Ignoring submission while streaming");
            return SubmitOutcome::Rejected(RejectReason::StreamInProgress);
        }

        let prior_messages = state.messages.len();
        let topic = state.composer.resolve_topic(&state.context);
        let plan = state.composer.compose(&topic, question, prior_messages);

        if plan.provider != state.provider {
            tracing::info!(
                "[Session] Provider switched to {} after {} messages",
                plan.provider,
                prior_messages
            );
        }
        state.topic = plan.topic;
        state.provider = plan.provider;

        state.messages.push(ChatMessage::user(question));
        let reply = ChatMessage::assistant_placeholder(plan.sources);
        let reply_id = reply.id;
        state.messages.push(reply);
        state.stream_state = StreamState::Streaming;
        state.streaming_reply = Some(reply_id);

        let on_tick = {
            let weak = Arc::downgrade(&self.state);
            move |partial: &str| apply_tick(&weak, reply_id, partial)
        };
        let on_complete = {
            let weak = Arc::downgrade(&self.state);
            move || complete_reply(&weak, reply_id)
        };
        state.scheduler.start(plan.answer, on_tick, on_complete);

        tracing::debug!(
            "[Session] Accepted submission #{} (topic: {}, provider: {})",
            prior_messages,
            state.topic,
            state.provider
        );
        state.publish();

        SubmitOutcome::Accepted {
            reply_id,
            provider: state.provider,
            topic: state.topic.clone(),
        }
    }

    /// Quick prompts offered for the current navigation context.
    pub fn quick_prompts(&self) -> &'static [&'static str] {
        let state = self.lock();
        quick_prompts(&state.composer.resolve_topic(&state.context))
    }

    /// Submits the quick prompt at `index`, exactly like typed text.
    pub fn submit_quick_prompt(&self, index: usize) -> SubmitOutcome {
        match self.quick_prompts().get(index) {
            Some(prompt) => self.submit(prompt),
            None => SubmitOutcome::Rejected(RejectReason::UnknownPrompt),
        }
    }

    /// Records a new navigation context; it applies from the next submission.
    pub fn navigate(&self, context: impl Into<String>) {
        let mut state = self.lock();
        state.context = context.into();
        tracing::debug!("[Session] Navigation context set to '{}'", state.context);
    }

    /// Stops the reply being revealed. Its partial content is kept.
    ///
    /// Returns `false` when nothing was streaming.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        let stopped = state.cancel_stream();
        if stopped {
            tracing::debug!("[Session] Stream stopped by user");
            state.publish();
        }
        stopped
    }

    /// Clears the conversation back to a single greeting message.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.cancel_stream();
        let greeting = ChatMessage::assistant(state.texts.reset_text());
        state.messages = vec![greeting];
        state.provider = ProviderLabel::Primary;
        state.unread = false;
        tracing::info!("[Session] Session {} reset", state.id);
        state.publish();
    }

    /// The widget became visible: clears the unread flag.
    pub fn foreground(&self) {
        let mut state = self.lock();
        state.foreground = true;
        if state.unread {
            state.unread = false;
            state.publish();
        }
    }

    /// The widget was closed or hidden; finished replies mark the session unread.
    pub fn background(&self) {
        self.lock().foreground = false;
    }

    /// Discards the session, cancelling any active reveal.
    pub fn teardown(self) {
        tracing::debug!("[Session] Tearing down session {}", self.lock().id);
        drop(self);
    }

    /// Current state as a read-only snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Snapshots published after every transition, including each tick.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.lock().publisher.subscribe()
    }

    pub fn id(&self) -> String {
        self.lock().id.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.lock().stream_state == StreamState::Streaming
    }

    /// Resolves once no reply is streaming.
    pub async fn wait_idle(&self) {
        let mut updates = self.subscribe();
        let _ = updates.wait_for(|snapshot| !snapshot.is_streaming()).await;
    }
}

impl Drop for ConversationSession {
    fn drop(&mut self) {
        let mut state = self.lock();
        if state.cancel_stream() {
            tracing::debug!("[Session] Cancelled active stream on drop");
        }
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_tick(weak: &Weak<Mutex<SessionState>>, reply_id: Uuid, partial: &str) -> ControlFlow<()> {
    let Some(shared) = weak.upgrade() else {
        return ControlFlow::Break(());
    };
    let mut state = lock_state(&shared);
    if state.streaming_reply != Some(reply_id) {
        return ControlFlow::Break(());
    }
    match state.reply_mut(reply_id) {
        Some(reply) => {
            reply.content.clear();
            reply.content.push_str(partial);
        }
        None => return ControlFlow::Break(()),
    }
    state.publish();
    ControlFlow::Continue(())
}

fn complete_reply(weak: &Weak<Mutex<SessionState>>, reply_id: Uuid) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut state = lock_state(&shared);
    if state.streaming_reply != Some(reply_id) {
        return;
    }

    state.streaming_reply = None;
    state.stream_state = StreamState::Idle;
    if let Some(id) = state.scheduler.active_id() {
        state.scheduler.release(id);
    }
    if !state.foreground {
        state.unread = true;
    }
    tracing::debug!("[Session] Reply {} complete (unread: {})", reply_id, state.unread);
    state.publish();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session(context: &str) -> ConversationSession {
        ConversationSession::new(
            Arc::new(ReplyComposer::default()),
            &AssistantConfig::default(),
            context,
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_has_greeting() {
        let session = session("/topics/javascript");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].content, SessionTexts::default().greeting);
        assert_eq!(snapshot.topic, TopicKey::known("javascript"));
        assert_eq!(snapshot.stream_state, StreamState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_submission_rejected_without_change() {
        let session = session("");
        let before = session.snapshot();
        assert_eq!(
            session.submit("   \n\t"),
            SubmitOutcome::Rejected(RejectReason::EmptyInput)
        );
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_while_streaming_rejected() {
        let session = session("python");
        assert!(session.submit("What is a generator?").is_accepted());
        let during = session.snapshot();
        assert_eq!(
            session.submit("Another one"),
            SubmitOutcome::Rejected(RejectReason::StreamInProgress)
        );
        assert_eq!(session.snapshot().messages.len(), during.messages.len());
        session.wait_idle().await;
        assert!(session.submit("Another one").is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_prompt_out_of_range() {
        let session = session("css");
        assert_eq!(
            session.submit_quick_prompt(99),
            SubmitOutcome::Rejected(RejectReason::UnknownPrompt)
        );
        assert!(session.submit_quick_prompt(0).is_accepted());
        assert_eq!(session.snapshot().messages[1].content, "Flexbox or Grid?");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_partial_reply() {
        let session = session("rust");
        session.submit("What is ownership?");
        tokio::time::sleep(Duration::from_millis(12 * 5 + 6)).await;

        assert!(session.stop());
        let frozen = session.snapshot().messages[2].content.clone();
        assert_eq!(frozen.chars().count(), 5);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let after = session.snapshot();
        assert_eq!(after.messages[2].content, frozen);
        assert_eq!(after.stream_state, StreamState::Idle);
        assert!(!session.stop());
    }
}
