use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::{
    error::StorageError,
    navigator::{NavEvent, Navigator, Screen},
    notify::NotificationScheduler,
    schedule::Schedule,
    screens::{AuthMode, AuthScreen, Outcome, ScheduleScreen, TimerScreen, TodoScreen},
    store::Stores,
    todo::TodoList,
};

/// State of the screen currently on display.
#[derive(Debug)]
pub enum ActiveScreen {
    SignUp(AuthScreen),
    Login(AuthScreen),
    TodoList(TodoScreen),
    Timer(TimerScreen),
    Schedule(ScheduleScreen),
}

pub struct App {
    stores: Stores,
    notifier: Box<dyn NotificationScheduler>,
    navigator: Navigator,
    pub active: ActiveScreen,
    /// Blocking storage error; the next key press dismisses it.
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(stores: Stores, notifier: Box<dyn NotificationScheduler>) -> Self {
        let navigator = Navigator::new();
        Self {
            stores,
            notifier,
            active: ActiveScreen::Login(AuthScreen::new(AuthMode::Login)),
            navigator,
            notice: None,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.navigator.current()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.handle_key_at(key, Instant::now());
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.notice.take().is_some() {
            return;
        }

        let outcome = match &mut self.active {
            ActiveScreen::SignUp(screen) | ActiveScreen::Login(screen) => {
                screen.handle_key(key, &self.stores)
            }
            ActiveScreen::TodoList(screen) => screen.handle_key(key, self.notifier.as_ref()),
            ActiveScreen::Timer(screen) => screen.handle_key(key, now),
            ActiveScreen::Schedule(screen) => screen.handle_key(key),
        };
        self.apply(outcome);
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let ActiveScreen::Timer(screen) = &mut self.active {
            screen.on_tick(now);
        }
    }

    /// How long the event loop may block waiting for input.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        match &self.active {
            ActiveScreen::Timer(screen) => screen.countdown.time_until_next_tick(now),
            _ => None,
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Stay => {}
            Outcome::Quit => self.should_quit = true,
            Outcome::Failed(err) => self.fail(err),
            Outcome::Navigate(event) => self.navigate(event),
        }
    }

    fn fail(&mut self, err: StorageError) {
        error!(error = %err, "storage operation failed");
        self.notice = Some(err.to_string());
    }

    /// Builds the target screen first; a store that fails to load keeps the
    /// current screen in place.
    fn navigate(&mut self, event: NavEvent) {
        let Some(next) = self.navigator.peek(event) else {
            debug!(?event, "navigation event does not apply here");
            return;
        };
        match self.build(next) {
            Ok(screen) => {
                self.navigator.dispatch(event);
                self.active = screen;
            }
            Err(err) => self.fail(err),
        }
    }

    fn build(&self, screen: Screen) -> Result<ActiveScreen, StorageError> {
        Ok(match screen {
            Screen::SignUp => ActiveScreen::SignUp(AuthScreen::new(AuthMode::SignUp)),
            Screen::Login => ActiveScreen::Login(AuthScreen::new(AuthMode::Login)),
            Screen::TodoList => {
                ActiveScreen::TodoList(TodoScreen::new(TodoList::load(self.stores.tasks.clone())?))
            }
            Screen::Timer => ActiveScreen::Timer(TimerScreen::new()),
            Screen::Schedule => {
                ActiveScreen::Schedule(ScheduleScreen::new(Schedule::load(self.stores.schedule.clone())?))
            }
        })
    }
}
