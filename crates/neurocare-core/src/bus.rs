//! Event Bus — session events flowing out to the presentation surface.

use tokio::sync::broadcast;

use crate::message::ChatMessage;

/// Events emitted by a chat session.
///
/// A presentation surface (terminal, web view, test harness) subscribes
/// and renders these; the session never touches rendering itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message was appended to the transcript.
    MessageAppended(ChatMessage),
    /// The "typing" indicator should be shown.
    TypingStarted,
    /// The "typing" indicator should be removed.
    TypingStopped,
    /// The input control should be locked (busy) or unlocked.
    InputLockChanged { locked: bool },
}

impl SessionEvent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageAppended(_) => "message_appended",
            Self::TypingStarted => "typing_started",
            Self::TypingStopped => "typing_stopped",
            Self::InputLockChanged { .. } => "input_lock_changed",
        }
    }
}

/// Broadcast bus for session events.
///
/// Publishing never blocks and never fails; events sent with no
/// subscriber attached are dropped.
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: SessionEvent) {
        tracing::trace!("session event: {}", event.kind());
        let _ = self.tx.send(event);
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
