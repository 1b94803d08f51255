//! Session states and the state-change listener list.

use std::fmt;
use std::time::Duration;

/// Phase of a session. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    FirstPhase,
    SecondPhase,
    Paused,
    Ended,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstPhase => "first_phase",
            Self::SecondPhase => "second_phase",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published synchronously to every listener whenever the state is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChange {
    /// The state just entered.
    pub state: SessionState,
    /// Session time elapsed at the moment of the change.
    pub elapsed: Duration,
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StateChange)>;

/// Observer list for [`StateChange`].
///
/// Listeners are called in registration order. Dispatch holds `&mut self`,
/// so the list cannot change while a change is being delivered.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StateChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn publish(&mut self, change: &StateChange) {
        for (_, listener) in &mut self.entries {
            listener(change);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn change(state: SessionState) -> StateChange {
        StateChange {
            state,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_publish_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            listeners.subscribe(move |c| log.borrow_mut().push((tag, c.state)));
        }

        listeners.publish(&change(SessionState::SecondPhase));

        assert_eq!(
            *log.borrow(),
            vec![
                ("a", SessionState::SecondPhase),
                ("b", SessionState::SecondPhase),
                ("c", SessionState::SecondPhase),
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();

        let counter = Rc::clone(&count);
        let id = listeners.subscribe(move |_| *counter.borrow_mut() += 1);
        assert_eq!(listeners.len(), 1);

        listeners.publish(&change(SessionState::FirstPhase));
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.publish(&change(SessionState::Ended));

        assert_eq!(*count.borrow(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_only_ended_is_terminal() {
        assert!(SessionState::Ended.is_terminal());
        assert!(!SessionState::FirstPhase.is_terminal());
        assert!(!SessionState::SecondPhase.is_terminal());
        assert!(!SessionState::Paused.is_terminal());
    }
}
