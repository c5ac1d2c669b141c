//! Session notifications.
//!
//! ## Learning: Broadcasting Instead of Callbacks
//!
//! Registering closures on the session would tie every listener's lifetime
//! to the `Editor`. A `tokio::sync::broadcast` channel sidesteps that: the
//! session sends owned `EditorEvent` values and each subscriber holds its
//! own receiver.
//!
//! A front end listens here and re-projects the document whenever
//! something changed. The events say *what* changed, for front ends that
//! want to repaint less.

use crate::autosave::SaveStatus;
use crate::block::BlockId;
use crate::storage::TemplateId;
use tokio::sync::broadcast;

/// Events that can occur in an editing session.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    // Document events
    /// A block was inserted at the given index
    BlockInserted { id: BlockId, index: usize },
    /// A block was removed
    BlockRemoved(BlockId),
    /// A block changed position
    BlockMoved { id: BlockId, index: usize },
    /// A block's content or style changed
    BlockUpdated(BlockId),
    /// The whole block list was swapped (undo, redo, template load, clear)
    DocumentReplaced,

    // Selection
    /// The selected block changed
    SelectionChanged(Option<BlockId>),

    // History
    /// Undo/redo availability after a commit or a step
    HistoryChanged { can_undo: bool, can_redo: bool },

    // Persistence
    /// The save indicator changed
    SaveStatusChanged(SaveStatus),
    /// A write to storage failed
    StorageFailed(String),

    // Templates
    TemplateSaved(TemplateId),
    TemplateRemoved(TemplateId),
}

/// Events buffered per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 256;

/// Fan-out of session events to any number of subscribers (surface, panel,
/// status line). A slow subscriber loses old events; it never blocks the
/// session.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Sends `event` to current subscribers, if any.
    pub fn emit(&self, event: EditorEvent) {
        let _ = self.sender.send(event);
    }

    /// A receiver for every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Async consumer that rides over lag instead of failing on it.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(editor.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let EditorEvent::StorageFailed(message) = event {
///             eprintln!("autosave failed: {message}");
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Drains every event already queued, without waiting.
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(_) => return events,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::DocumentReplaced);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EditorEvent::DocumentReplaced));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(EditorEvent::BlockRemoved("b_1".into()));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new();
        bus.emit(EditorEvent::DocumentReplaced);
    }

    #[tokio::test]
    async fn test_handler_next_and_drain() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(EditorEvent::SelectionChanged(None));
        assert_eq!(handler.next().await, Some(EditorEvent::SelectionChanged(None)));

        bus.emit(EditorEvent::DocumentReplaced);
        bus.emit(EditorEvent::HistoryChanged { can_undo: true, can_redo: false });
        assert_eq!(handler.drain().len(), 2);
        assert!(handler.drain().is_empty());
    }
}
