//! Which screen is active, and how one screen leads to another.

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignUp,
    Login,
    TodoList,
    Timer,
    Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    SignedUp,
    LoggedIn,
    SwitchToLogin,
    SwitchToSignUp,
    OpenTimer,
    OpenSchedule,
    Back,
}

/// The transition table. `None` means the event does not apply to `from`.
///
/// Timer and Schedule replace the to-do list; `Back` replaces them with it.
pub fn transition(from: Screen, event: NavEvent) -> Option<Screen> {
    use NavEvent::*;
    use Screen::*;

    match (from, event) {
        (SignUp, SignedUp) | (SignUp, SwitchToLogin) => Some(Login),
        (Login, LoggedIn) => Some(TodoList),
        (Login, SwitchToSignUp) => Some(SignUp),
        (TodoList, OpenTimer) => Some(Timer),
        (TodoList, OpenSchedule) => Some(Schedule),
        (Timer, Back) | (Schedule, Back) => Some(TodoList),
        _ => None,
    }
}

#[derive(Debug)]
pub struct Navigator {
    current: Screen,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Screen::Login,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Where `event` would lead without moving there.
    pub fn peek(&self, event: NavEvent) -> Option<Screen> {
        transition(self.current, event)
    }

    /// Applies `event`, returning the new screen when it changed.
    pub fn dispatch(&mut self, event: NavEvent) -> Option<Screen> {
        match transition(self.current, event) {
            Some(next) => {
                info!(from = ?self.current, to = ?next, "navigate");
                self.current = next;
                Some(next)
            }
            None => {
                debug!(screen = ?self.current, ?event, "ignored navigation event");
                None
            }
        }
    }
}
