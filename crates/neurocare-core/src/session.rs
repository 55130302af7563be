//! Chat session — transcript, busy lock, and the tiered reply cascade.
//!
//! Each user message is resolved by trying, in order:
//! 1. the primary chat service (needs a mood-log identifier),
//! 2. the secondary chatbot service (addressed by username),
//! 3. the local responder, which cannot fail.
//!
//! Once the primary tier fails the session sticks to the chatbot tier
//! for the rest of its lifetime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::bus::{EventBus, SessionEvent};
use crate::error::{NeuroCareError, Result};
use crate::message::ChatMessage;
use crate::mood::{self, MoodContext};
use crate::responder;
use crate::tier::{ChatTier, TierRequest};

/// Default upper bound on a single remote tier attempt.
pub const DEFAULT_TIER_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TierSlot {
    Primary,
    Chatbot,
}

const FULL_PLAN: &[TierSlot] = &[TierSlot::Primary, TierSlot::Chatbot];
const CHATBOT_PLAN: &[TierSlot] = &[TierSlot::Chatbot];

/// One chat page visit.
pub struct ChatSession {
    session_id: i64,
    username: String,
    current_mood: String,
    context: Arc<dyn MoodContext>,
    primary: Arc<dyn ChatTier>,
    chatbot: Arc<dyn ChatTier>,
    tier_timeout: Duration,
    use_chatbot_tier: AtomicBool,
    is_busy: AtomicBool,
    transcript: Mutex<Vec<ChatMessage>>,
    bus: EventBus,
}

impl ChatSession {
    pub fn new(
        context: Arc<dyn MoodContext>,
        primary: Arc<dyn ChatTier>,
        chatbot: Arc<dyn ChatTier>,
    ) -> Self {
        let username = context
            .username()
            .unwrap_or_else(|| mood::DEFAULT_USERNAME.to_string());
        let current_mood = context
            .current_mood()
            .unwrap_or_else(|| mood::DEFAULT_MOOD.to_string());

        Self {
            session_id: chrono::Utc::now().timestamp_millis(),
            username,
            current_mood,
            context,
            primary,
            chatbot,
            tier_timeout: DEFAULT_TIER_TIMEOUT,
            use_chatbot_tier: AtomicBool::new(false),
            is_busy: AtomicBool::new(false),
            transcript: Mutex::new(Vec::new()),
            bus: EventBus::default(),
        }
    }

    pub fn with_tier_timeout(mut self, timeout: Duration) -> Self {
        self.tier_timeout = timeout;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn current_mood(&self) -> &str {
        &self.current_mood
    }

    /// True once the primary tier has failed in this session.
    pub fn uses_chatbot_tier(&self) -> bool {
        self.use_chatbot_tier.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy.load(Ordering::SeqCst)
    }

    /// Snapshot of the transcript so far.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.lock_transcript().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    /// Greet the user according to their mood and unlock input.
    pub fn start(&self) -> &'static str {
        info!(
            session_id = self.session_id,
            "Starting chat session (mood: {})", self.current_mood
        );
        let greeting = mood::greeting_for(&self.current_mood);
        self.append(ChatMessage::assistant(greeting));
        self.bus.publish(SessionEvent::InputLockChanged { locked: false });
        greeting
    }

    /// Send a user message and wait for the assistant's reply.
    ///
    /// Returns `None` without touching the session when the message is
    /// blank or another send is still in flight.
    pub async fn send(&self, message: &str) -> Option<String> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        let Some(_busy) = BusyGuard::acquire(&self.is_busy, &self.bus) else {
            debug!(session_id = self.session_id, "Send ignored, session busy");
            return None;
        };

        debug!(
            session_id = self.session_id,
            "Sending message ({} chars)",
            message.len()
        );
        self.append(ChatMessage::user(message));

        let typing = TypingIndicator::show(&self.bus);
        let reply = self.resolve(message).await;
        drop(typing);

        self.append(ChatMessage::assistant(&reply));
        Some(reply)
    }

    async fn resolve(&self, message: &str) -> String {
        let mood_log_id = self.context.mood_log_id();
        let request = TierRequest {
            session_id: self.session_id,
            username: &self.username,
            mood_log_id: mood_log_id.as_deref(),
            message,
        };

        let plan = if self.uses_chatbot_tier() {
            CHATBOT_PLAN
        } else {
            FULL_PLAN
        };

        for slot in plan {
            let tier = match slot {
                TierSlot::Primary => self.primary.as_ref(),
                TierSlot::Chatbot => self.chatbot.as_ref(),
            };

            match self.attempt(tier, request).await {
                Ok(reply) => {
                    info!(session_id = self.session_id, "{} tier replied", tier.name());
                    return reply;
                }
                Err(e) => {
                    warn!(session_id = self.session_id, "{} tier failed: {}", tier.name(), e);
                    if *slot == TierSlot::Primary {
                        self.use_chatbot_tier.store(true, Ordering::SeqCst);
                    }
                }
            }
        }

        info!(session_id = self.session_id, "All remote tiers failed, replying locally");
        responder::local_reply(message)
    }

    async fn attempt(&self, tier: &dyn ChatTier, request: TierRequest<'_>) -> Result<String> {
        if tier.requires_mood_log() && request.mood_log_id.is_none() {
            return Err(NeuroCareError::MissingMoodLog);
        }

        let reply = tokio::time::timeout(self.tier_timeout, tier.reply(request))
            .await
            .map_err(|_| NeuroCareError::Timeout {
                service: tier.name().to_string(),
                after: self.tier_timeout,
            })??;

        if reply.trim().is_empty() {
            return Err(NeuroCareError::EmptyReply {
                service: tier.name().to_string(),
            });
        }
        Ok(reply)
    }

    fn append(&self, message: ChatMessage) {
        self.lock_transcript().push(message.clone());
        self.bus.publish(SessionEvent::MessageAppended(message));
    }

    fn lock_transcript(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Holds the busy flag for one send; releases it and unlocks input on drop.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    bus: &'a EventBus,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, bus: &'a EventBus) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        bus.publish(SessionEvent::InputLockChanged { locked: true });
        Some(Self { flag, bus })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.bus.publish(SessionEvent::InputLockChanged { locked: false });
    }
}

struct TypingIndicator<'a> {
    bus: &'a EventBus,
}

impl<'a> TypingIndicator<'a> {
    fn show(bus: &'a EventBus) -> Self {
        bus.publish(SessionEvent::TypingStarted);
        Self { bus }
    }
}

impl Drop for TypingIndicator<'_> {
    fn drop(&mut self) {
        self.bus.publish(SessionEvent::TypingStopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::ProfileContext;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    enum Behavior {
        Reply(&'static str),
        Fail(u16),
        Hang,
        Panic,
        Gated {
            entered: Arc<Notify>,
            release: Arc<Notify>,
        },
    }

    struct FakeTier {
        name: &'static str,
        needs_mood_log: bool,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeTier {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                needs_mood_log: false,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn primary(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name: "primary",
                needs_mood_log: true,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatTier for FakeTier {
        fn name(&self) -> &str {
            self.name
        }

        fn requires_mood_log(&self) -> bool {
            self.needs_mood_log
        }

        async fn reply(&self, _request: TierRequest<'_>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Fail(status) => Err(NeuroCareError::Status {
                    service: self.name.to_string(),
                    status: *status,
                }),
                Behavior::Hang => std::future::pending().await,
                Behavior::Panic => panic!("{} tier blew up", self.name),
                Behavior::Gated { entered, release } => {
                    entered.notify_one();
                    release.notified().await;
                    Ok("released".to_string())
                }
            }
        }
    }

    fn context(mood: Option<&str>, mood_log_id: Option<&str>) -> Arc<ProfileContext> {
        Arc::new(ProfileContext {
            username: Some("tester".to_string()),
            mood: mood.map(str::to_string),
            mood_log_id: mood_log_id.map(str::to_string),
        })
    }

    fn session(
        ctx: Arc<ProfileContext>,
        primary: &Arc<FakeTier>,
        chatbot: &Arc<FakeTier>,
    ) -> ChatSession {
        ChatSession::new(ctx, primary.clone(), chatbot.clone())
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_defaults_when_context_empty() {
        let primary = FakeTier::primary(Behavior::Reply("ok"));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = ChatSession::new(Arc::new(ProfileContext::default()), primary, chatbot);

        assert_eq!(s.username(), "User");
        assert_eq!(s.current_mood(), "Neutral");
        assert!(!s.is_busy());
        assert!(!s.uses_chatbot_tier());
        assert!(s.session_id > 0);
    }

    #[test]
    fn test_start_appends_mood_greeting() {
        let primary = FakeTier::primary(Behavior::Reply("ok"));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = session(context(Some("Stressed"), None), &primary, &chatbot);
        let mut rx = s.subscribe();

        let greeting = s.start();

        assert_eq!(greeting, mood::greeting_for("Stressed"));
        assert_eq!(s.transcript(), vec![ChatMessage::assistant(greeting)]);
        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::MessageAppended(ChatMessage::assistant(greeting)),
                SessionEvent::InputLockChanged { locked: false },
            ]
        );
    }

    #[tokio::test]
    async fn test_primary_success() {
        let primary = FakeTier::primary(Behavior::Reply("ok"));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = session(context(None, Some("17")), &primary, &chatbot);

        let reply = s.send("  hello there  ").await;

        assert_eq!(reply.as_deref(), Some("ok"));
        assert_eq!(
            s.transcript(),
            vec![ChatMessage::user("hello there"), ChatMessage::assistant("ok")]
        );
        assert!(!s.uses_chatbot_tier());
        assert!(!s.is_busy());
        assert_eq!(chatbot.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_mood_log_skips_primary() {
        let primary = FakeTier::primary(Behavior::Reply("ok"));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = session(context(None, None), &primary, &chatbot);

        let reply = s.send("hello").await;

        assert_eq!(reply.as_deref(), Some("hi"));
        assert_eq!(s.transcript().last(), Some(&ChatMessage::assistant("hi")));
        assert_eq!(primary.calls(), 0);
        assert!(s.uses_chatbot_tier());
    }

    #[tokio::test]
    async fn test_chatbot_tier_is_sticky() {
        let primary = FakeTier::primary(Behavior::Fail(500));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = session(context(None, Some("17")), &primary, &chatbot);

        s.send("first").await;
        assert_eq!(primary.calls(), 1);
        assert!(s.uses_chatbot_tier());

        s.send("second").await;
        s.send("third").await;
        assert_eq!(primary.calls(), 1);
        assert_eq!(chatbot.calls(), 3);
        assert!(s.uses_chatbot_tier());
    }

    #[tokio::test]
    async fn test_all_remote_tiers_fail_uses_local_responder() {
        let primary = FakeTier::primary(Behavior::Fail(500));
        let chatbot = FakeTier::new("chatbot", Behavior::Fail(500));
        let s = session(context(None, Some("17")), &primary, &chatbot);

        let reply = s.send("I feel so anxious today").await;
        assert_eq!(
            reply.as_deref(),
            Some("Anxiety can be overwhelming. Do you know what triggered it?")
        );

        let reply = s.send("banana").await.unwrap();
        assert!(responder::GENERIC_REPLIES.contains(&reply.as_str()));
        assert_eq!(s.transcript().len(), 4);
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn test_blank_messages_are_ignored() {
        let primary = FakeTier::primary(Behavior::Reply("ok"));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = session(context(None, Some("17")), &primary, &chatbot);
        let mut rx = s.subscribe();

        assert_eq!(s.send("").await, None);
        assert_eq!(s.send("   ").await, None);
        assert_eq!(s.send("\n\t").await, None);

        assert!(s.transcript().is_empty());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_send_while_busy_is_ignored() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let primary = FakeTier::primary(Behavior::Gated {
            entered: entered.clone(),
            release: release.clone(),
        });
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = Arc::new(session(context(None, Some("17")), &primary, &chatbot));

        let inflight = {
            let s = s.clone();
            tokio::spawn(async move { s.send("first").await })
        };
        entered.notified().await;

        assert!(s.is_busy());
        assert_eq!(s.send("second").await, None);
        assert_eq!(s.transcript(), vec![ChatMessage::user("first")]);

        release.notify_one();
        assert_eq!(inflight.await.unwrap().as_deref(), Some("released"));
        assert!(!s.is_busy());
        assert_eq!(s.transcript().len(), 2);
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_hung_tier_times_out() {
        let primary = FakeTier::primary(Behavior::Hang);
        let chatbot = FakeTier::new("chatbot", Behavior::Hang);
        let s = session(context(None, Some("17")), &primary, &chatbot)
            .with_tier_timeout(Duration::from_millis(50));

        let reply = s.send("bye").await;

        assert_eq!(reply.as_deref(), Some("Take care! I'm always here if you need me."));
        assert!(!s.is_busy());
        assert!(s.uses_chatbot_tier());
        assert_eq!(chatbot.calls(), 1);
    }

    #[tokio::test]
    async fn test_panicking_tier_releases_busy_flag() {
        let primary = FakeTier::primary(Behavior::Panic);
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = Arc::new(session(context(None, Some("17")), &primary, &chatbot));
        let mut rx = s.subscribe();

        let result = {
            let s = s.clone();
            tokio::spawn(async move { s.send("hello").await }).await
        };

        assert!(result.unwrap_err().is_panic());
        assert!(!s.is_busy());
        assert_eq!(
            drain(&mut rx).last(),
            Some(&SessionEvent::InputLockChanged { locked: false })
        );
        assert_eq!(s.transcript(), vec![ChatMessage::user("hello")]);
    }

    #[tokio::test]
    async fn test_empty_remote_reply_falls_through() {
        let primary = FakeTier::primary(Behavior::Reply("  "));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = session(context(None, Some("17")), &primary, &chatbot);

        assert_eq!(s.send("hello").await.as_deref(), Some("hi"));
        assert!(s.uses_chatbot_tier());
    }

    #[tokio::test]
    async fn test_event_order_for_send() {
        let primary = FakeTier::primary(Behavior::Reply("ok"));
        let chatbot = FakeTier::new("chatbot", Behavior::Reply("hi"));
        let s = session(context(None, Some("17")), &primary, &chatbot);
        let mut rx = s.subscribe();

        s.send("hello").await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::InputLockChanged { locked: true },
                SessionEvent::MessageAppended(ChatMessage::user("hello")),
                SessionEvent::TypingStarted,
                SessionEvent::TypingStopped,
                SessionEvent::MessageAppended(ChatMessage::assistant("ok")),
                SessionEvent::InputLockChanged { locked: false },
            ]
        );
    }
}
