//! Per-screen input state and key handling.
//!
//! A screen never switches screens itself. Its key handler returns an
//! [`Outcome`] and the [`App`](crate::app::App) applies it through the
//! navigator.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use std::time::Instant;
use tui_textarea::{CursorMove, TextArea};
use uuid::Uuid;

use crate::{
    auth,
    error::{AppError, StorageError},
    navigator::NavEvent,
    notify::NotificationScheduler,
    schedule::Schedule,
    store::Stores,
    task::Priority,
    timer::{parse_minutes, Countdown},
    todo::{TaskDraft, TodoList},
};

#[derive(Debug)]
pub enum Outcome {
    Stay,
    Navigate(NavEvent),
    Quit,
    Failed(StorageError),
}

impl Outcome {
    /// Validation errors become an inline message; storage errors are
    /// handed to the app.
    fn from_error(err: AppError, message: &mut Option<String>) -> Self {
        match err {
            AppError::Validation(err) => {
                *message = Some(err.to_string());
                Outcome::Stay
            }
            AppError::Storage(err) => Outcome::Failed(err),
        }
    }
}

/// A single-line `TextArea` with no cursor-line underline.
fn line_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(Style::default());
    input
}

fn masked_input() -> TextArea<'static> {
    let mut input = line_input();
    input.set_mask_char('*');
    input
}

pub fn text_of<'a>(input: &'a TextArea) -> &'a str {
    input.lines().first().map_or("", String::as_str)
}

fn clear(input: &mut TextArea) {
    input.move_cursor(CursorMove::Head);
    input.delete_line_by_end();
}

/// Only the focused input shows a cursor.
fn set_focused(input: &mut TextArea, focused: bool) {
    input.set_cursor_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
}

/// Forwards an editing key to a single-line input. Keys that would open a
/// second line never reach it.
fn edit(input: &mut TextArea, key: KeyEvent) {
    let newline = key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('m' | 'j'));
    let editing = matches!(
        key.code,
        KeyCode::Char(_)
            | KeyCode::Backspace
            | KeyCode::Delete
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Home
            | KeyCode::End
    );
    if editing && !newline {
        input.input(key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignUp,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct AuthScreen {
    pub mode: AuthMode,
    pub username: TextArea<'static>,
    pub password: TextArea<'static>,
    pub focus: AuthField,
    pub error: Option<String>,
}

impl AuthScreen {
    pub fn new(mode: AuthMode) -> Self {
        let mut screen = Self {
            mode,
            username: line_input(),
            password: masked_input(),
            focus: AuthField::Username,
            error: None,
        };
        screen.refocus();
        screen
    }

    pub fn handle_key(&mut self, key: KeyEvent, stores: &Stores) -> Outcome {
        match key.code {
            KeyCode::Esc => Outcome::Quit,
            KeyCode::F(2) => Outcome::Navigate(match self.mode {
                AuthMode::SignUp => NavEvent::SwitchToLogin,
                AuthMode::Login => NavEvent::SwitchToSignUp,
            }),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    AuthField::Username => AuthField::Password,
                    AuthField::Password => AuthField::Username,
                };
                self.refocus();
                Outcome::Stay
            }
            KeyCode::Enter => self.submit(stores),
            _ => {
                match self.focus {
                    AuthField::Username => edit(&mut self.username, key),
                    AuthField::Password => edit(&mut self.password, key),
                }
                Outcome::Stay
            }
        }
    }

    fn refocus(&mut self) {
        set_focused(&mut self.username, self.focus == AuthField::Username);
        set_focused(&mut self.password, self.focus == AuthField::Password);
    }

    fn submit(&mut self, stores: &Stores) -> Outcome {
        let (username, password) = (text_of(&self.username), text_of(&self.password));
        let (result, success) = match self.mode {
            AuthMode::SignUp => (
                auth::sign_up(&stores.credentials, username, password),
                NavEvent::SignedUp,
            ),
            AuthMode::Login => (
                auth::log_in(&stores.credentials, username, password),
                NavEvent::LoggedIn,
            ),
        };
        match result {
            Ok(()) => {
                self.error = None;
                Outcome::Navigate(success)
            }
            Err(err) => Outcome::from_error(err, &mut self.error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoField {
    Text,
    DueDate,
    Priority,
    Tasks,
}

impl TodoField {
    fn next(self) -> Self {
        match self {
            TodoField::Text => TodoField::DueDate,
            TodoField::DueDate => TodoField::Priority,
            TodoField::Priority => TodoField::Tasks,
            TodoField::Tasks => TodoField::Text,
        }
    }

    fn previous(self) -> Self {
        match self {
            TodoField::Text => TodoField::Tasks,
            TodoField::DueDate => TodoField::Text,
            TodoField::Priority => TodoField::DueDate,
            TodoField::Tasks => TodoField::Priority,
        }
    }
}

#[derive(Debug)]
pub struct TodoScreen {
    pub list: TodoList,
    pub text: TextArea<'static>,
    pub due_date: TextArea<'static>,
    pub priority: Option<Priority>,
    pub focus: TodoField,
    pub selected: usize,
    pub error: Option<String>,
}

impl TodoScreen {
    pub fn new(list: TodoList) -> Self {
        let mut screen = Self {
            list,
            text: line_input(),
            due_date: line_input(),
            priority: None,
            focus: TodoField::Text,
            selected: 0,
            error: None,
        };
        screen.refocus();
        screen
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.list.tasks().get(self.selected).map(|t| t.id)
    }

    pub fn handle_key(&mut self, key: KeyEvent, notifier: &dyn NotificationScheduler) -> Outcome {
        match key.code {
            KeyCode::Esc => return Outcome::Quit,
            KeyCode::F(3) => return Outcome::Navigate(NavEvent::OpenTimer),
            KeyCode::F(4) => return Outcome::Navigate(NavEvent::OpenSchedule),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                self.refocus();
                return Outcome::Stay;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                self.refocus();
                return Outcome::Stay;
            }
            _ => {}
        }

        match self.focus {
            TodoField::Text | TodoField::DueDate => match key.code {
                KeyCode::Enter => self.add(notifier),
                _ => {
                    if self.focus == TodoField::Text {
                        edit(&mut self.text, key);
                    } else {
                        edit(&mut self.due_date, key);
                    }
                    Outcome::Stay
                }
            },
            TodoField::Priority => match key.code {
                KeyCode::Enter => self.add(notifier),
                KeyCode::Right => {
                    self.priority = Priority::next(self.priority);
                    Outcome::Stay
                }
                KeyCode::Left => {
                    self.priority = Priority::previous(self.priority);
                    Outcome::Stay
                }
                _ => Outcome::Stay,
            },
            TodoField::Tasks => match key.code {
                KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                    Outcome::Stay
                }
                KeyCode::Down => {
                    if self.selected + 1 < self.list.tasks().len() {
                        self.selected += 1;
                    }
                    Outcome::Stay
                }
                KeyCode::Char(' ') => self.toggle_selected(),
                KeyCode::Delete | KeyCode::Char('d') => self.delete_selected(),
                _ => Outcome::Stay,
            },
        }
    }

    fn refocus(&mut self) {
        set_focused(&mut self.text, self.focus == TodoField::Text);
        set_focused(&mut self.due_date, self.focus == TodoField::DueDate);
    }

    fn add(&mut self, notifier: &dyn NotificationScheduler) -> Outcome {
        let draft = TaskDraft {
            text: text_of(&self.text).to_string(),
            due_date: text_of(&self.due_date).trim().to_string(),
            priority: self.priority,
        };
        match self.list.add(draft, notifier) {
            Ok(_) => {
                clear(&mut self.text);
                clear(&mut self.due_date);
                self.priority = None;
                self.focus = TodoField::Text;
                self.refocus();
                self.error = None;
                Outcome::Stay
            }
            Err(err) => Outcome::from_error(err, &mut self.error),
        }
    }

    fn toggle_selected(&mut self) -> Outcome {
        let Some(id) = self.selected_id() else {
            return Outcome::Stay;
        };
        match self.list.toggle(id) {
            Ok(_) => Outcome::Stay,
            Err(err) => Outcome::Failed(err),
        }
    }

    fn delete_selected(&mut self) -> Outcome {
        let Some(id) = self.selected_id() else {
            return Outcome::Stay;
        };
        match self.list.delete(id) {
            Ok(_) => {
                let len = self.list.tasks().len();
                self.selected = self.selected.min(len.saturating_sub(1));
                Outcome::Stay
            }
            Err(err) => Outcome::Failed(err),
        }
    }
}

#[derive(Debug)]
pub struct TimerScreen {
    pub minutes: TextArea<'static>,
    pub countdown: Countdown,
    pub status: String,
    pub error: Option<String>,
}

impl TimerScreen {
    pub fn new() -> Self {
        Self {
            minutes: line_input(),
            countdown: Countdown::new(),
            status: String::new(),
            error: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Outcome {
        match key.code {
            KeyCode::Esc => {
                self.countdown.cancel();
                Outcome::Navigate(NavEvent::Back)
            }
            KeyCode::Enter => {
                self.start(now);
                Outcome::Stay
            }
            _ => {
                edit(&mut self.minutes, key);
                Outcome::Stay
            }
        }
    }

    fn start(&mut self, now: Instant) {
        let started = parse_minutes(text_of(&self.minutes))
            .and_then(|minutes| self.countdown.start(minutes, now).map(|()| minutes));
        match started {
            Ok(minutes) => {
                self.status = format!("Timer started for {} minutes...", minutes);
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Applies due ticks to the status line. Returns how many were applied.
    pub fn on_tick(&mut self, now: Instant) -> usize {
        let ticks = self.countdown.advance(now);
        if let Some(last) = ticks.last() {
            self.status = last.message();
        }
        ticks.len()
    }
}

#[derive(Debug)]
pub struct ScheduleScreen {
    pub schedule: Schedule,
    pub entry: TextArea<'static>,
}

impl ScheduleScreen {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            entry: line_input(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Esc => Outcome::Navigate(NavEvent::Back),
            KeyCode::Enter => match self.schedule.add(text_of(&self.entry)) {
                Ok(true) => {
                    clear(&mut self.entry);
                    Outcome::Stay
                }
                Ok(false) => Outcome::Stay,
                Err(err) => Outcome::Failed(err),
            },
            _ => {
                edit(&mut self.entry, key);
                Outcome::Stay
            }
        }
    }
}
