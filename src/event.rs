//! Notifications emitted by the passes when they merge or remove a node.
//!
//! Passes never depend on whether someone listens: pick [`Silent`] to ignore events,
//! [`LogSink`] to forward them to the [`log`] facade, or a `Vec<Event>` to collect them.

use std::fmt::Display;

use crate::{Literal, NodeId};

/// The pass responsible for an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Strash,
    Simplify,
    Fraig,
    Sweep,
}

impl EventKind {
    fn prefix(&self) -> &'static str {
        match self {
            EventKind::Strash => "Strashing",
            EventKind::Simplify => "Simplifying",
            EventKind::Fraig => "Fraig",
            EventKind::Sweep => "Sweeping",
        }
    }
}

/// A node was merged into `surviving`, or swept away if `surviving` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub surviving: Option<Literal>,
    pub removed: NodeId,
}

impl Event {
    pub fn merge(kind: EventKind, surviving: Literal, removed: NodeId) -> Self {
        Event {
            kind,
            surviving: Some(surviving),
            removed,
        }
    }

    pub fn sweep(removed: NodeId) -> Self {
        Event {
            kind: EventKind::Sweep,
            surviving: None,
            removed,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.surviving {
            Some(lit) => write!(
                f,
                "{}: {} merging {}{}...",
                self.kind.prefix(),
                lit.node(),
                if lit.is_complement() { "!" } else { "" },
                self.removed
            ),
            None => write!(f, "{}: AIG({}) removed...", self.kind.prefix(), self.removed),
        }
    }
}

/// Receiver of the [`Event`]s of a pass.
pub trait EventSink {
    fn notify(&mut self, event: Event);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl EventSink for Silent {
    fn notify(&mut self, _event: Event) {}
}

/// Forwards every event to `log::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&mut self, event: Event) {
        log::info!("{}", event);
    }
}

impl EventSink for Vec<Event> {
    fn notify(&mut self, event: Event) {
        self.push(event);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_test() {
        let e = Event::merge(EventKind::Strash, Literal::new(3, true), 7);
        assert_eq!(e.to_string(), "Strashing: 3 merging !7...");
        let e = Event::merge(EventKind::Fraig, Literal::new(2, false), 9);
        assert_eq!(e.to_string(), "Fraig: 2 merging 9...");
        assert_eq!(Event::sweep(4).to_string(), "Sweeping: AIG(4) removed...");
    }

    #[test]
    fn sinks() {
        let mut events: Vec<Event> = Vec::new();
        events.notify(Event::sweep(1));
        events.notify(Event::merge(EventKind::Simplify, Literal::FALSE, 2));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].surviving, Some(Literal::FALSE));

        Silent.notify(Event::sweep(1));
        LogSink.notify(Event::sweep(1));
    }
}
