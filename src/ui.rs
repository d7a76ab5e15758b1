use crate::{
    app::{ActiveScreen, App},
    screens::{AuthField, AuthMode, AuthScreen, ScheduleScreen, TimerScreen, TodoField, TodoScreen},
    timer::TimerState,
};
use chrono::Local;
use crossterm::{
    cursor,
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::warn;
use tui_textarea::TextArea;

// Upper bound on how long the loop blocks when no countdown is due.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Runs its closure when dropped, including while unwinding from a panic.
pub struct RestoreOnDrop<F: FnMut()>(pub F);

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.0)()
    }
}

/// Leaves raw mode and the alternate screen. Safe to call more than once.
pub fn restore_terminal() {
    if let Err(err) = disable_raw_mode() {
        warn!(error = %err, "failed to leave raw mode");
    }
    if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show) {
        warn!(error = %err, "failed to leave the alternate screen");
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        let timeout = app
            .time_until_next_tick(Instant::now())
            .map_or(IDLE_POLL, |t| t.min(IDLE_POLL));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
        app.on_tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let help = match &app.active {
        ActiveScreen::SignUp(screen) | ActiveScreen::Login(screen) => {
            draw_auth(f, chunks[0], screen);
            match screen.mode {
                AuthMode::SignUp => "Tab: field  Enter: sign up  F2: log in instead  Esc: quit",
                AuthMode::Login => "Tab: field  Enter: log in  F2: sign up instead  Esc: quit",
            }
        }
        ActiveScreen::TodoList(screen) => {
            draw_todo(f, chunks[0], screen);
            "Tab: field  Enter: add  Space: done  d: delete  F3: timer  F4: schedule  Esc: quit"
        }
        ActiveScreen::Timer(screen) => {
            draw_timer(f, chunks[0], screen);
            "Enter: start  Esc: back to to-do list"
        }
        ActiveScreen::Schedule(screen) => {
            draw_schedule(f, chunks[0], screen);
            "Enter: add  Esc: back to to-do list"
        }
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );

    if let Some(notice) = &app.notice {
        draw_notice(f, notice);
    }
}

fn input(f: &mut Frame, area: Rect, title: &str, field: &TextArea, focused: bool) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_style(focused));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(field, inner);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn error_line(error: &Option<String>) -> Paragraph<'_> {
    Paragraph::new(error.as_deref().unwrap_or_default()).style(Style::default().fg(Color::Red))
}

fn draw_auth(f: &mut Frame, area: Rect, screen: &AuthScreen) {
    let title = match screen.mode {
        AuthMode::SignUp => "Sign Up",
        AuthMode::Login => "Log In",
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(Block::default().title(title).borders(Borders::ALL), area);
    input(f, chunks[0], "Username", &screen.username, screen.focus == AuthField::Username);
    input(f, chunks[1], "Password", &screen.password, screen.focus == AuthField::Password);
    f.render_widget(error_line(&screen.error), chunks[2]);
}

fn draw_todo(f: &mut Frame, area: Rect, screen: &TodoScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);
    let fields = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    input(f, chunks[0], "What is your task?", &screen.text, screen.focus == TodoField::Text);
    input(
        f,
        fields[0],
        "Due date (DD-MM-YYYY)",
        &screen.due_date,
        screen.focus == TodoField::DueDate,
    );
    let priority = screen.priority.map_or("-".to_string(), |p| format!("< {} >", p));
    f.render_widget(
        Paragraph::new(priority).block(
            Block::default()
                .title("Priority")
                .borders(Borders::ALL)
                .border_style(focus_style(screen.focus == TodoField::Priority)),
        ),
        fields[1],
    );
    f.render_widget(error_line(&screen.error), chunks[2]);

    let today = Local::now().date_naive();
    let items: Vec<ListItem> = screen
        .list
        .tasks()
        .iter()
        .map(|t| {
            let style = if t.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::White)
            };
            // Only the due date turns red once it has passed.
            let due_style = if t.is_overdue(today) {
                Style::default().fg(Color::Red)
            } else {
                style
            };
            let (head, due) = t.display_parts();
            let mut spans = vec![Span::styled(head, style)];
            spans.extend(due.map(|d| Span::styled(d, due_style)));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Tasks ({})", screen.list.tasks().len()))
                .borders(Borders::ALL)
                .border_style(focus_style(screen.focus == TodoField::Tasks)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if screen.focus == TodoField::Tasks && !screen.list.tasks().is_empty() {
        state.select(Some(screen.selected));
    }
    f.render_stateful_widget(list, chunks[3], &mut state);
}

fn draw_timer(f: &mut Frame, area: Rect, screen: &TimerScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    input(f, chunks[0], "Set timer (in minutes)", &screen.minutes, true);
    f.render_widget(
        Paragraph::new(screen.status.as_str())
            .style(Style::default().fg(Color::Green))
            .block(Block::default().title(timer_title(screen.countdown.state())).borders(Borders::ALL)),
        chunks[1],
    );
    f.render_widget(error_line(&screen.error), chunks[2]);
}

fn timer_title(state: TimerState) -> &'static str {
    match state {
        TimerState::Idle => "Timer",
        TimerState::Running => "Timer (running)",
        TimerState::Finished => "Timer (done)",
    }
}

fn draw_schedule(f: &mut Frame, area: Rect, screen: &ScheduleScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    input(f, chunks[0], "Enter your schedule details", &screen.entry, true);
    let items: Vec<ListItem> = screen
        .schedule
        .entries()
        .iter()
        .map(|e| ListItem::new(Span::styled(e.as_str(), Style::default().fg(Color::Green))))
        .collect();
    f.render_widget(
        List::new(items).block(Block::default().title("Your Schedule").borders(Borders::ALL)),
        chunks[1],
    );
}

fn draw_notice(f: &mut Frame, notice: &str) {
    let area = f.area();
    let popup = Rect {
        x: area.width / 8,
        y: area.height / 3,
        width: area.width - area.width / 4,
        height: 5,
    }
    .intersection(area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(notice.to_string()),
            Line::from("Press any key to continue."),
        ])
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Storage error").borders(Borders::ALL)),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        notify::LogScheduler,
        screens::text_of,
        store::Stores,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, buffer::Buffer};
    use std::fs;
    use tempfile::TempDir;

    fn buffer(app: &App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn rendered(app: &App) -> String {
        buffer(app).content.iter().map(|cell| cell.symbol()).collect()
    }

    fn app_in(dir: &TempDir) -> App {
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        App::new(Stores::from_config(&config), Box::new(LogScheduler))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn restore_runs_on_early_return_and_panic() {
        use std::{cell::Cell, panic};

        let restored = Cell::new(0);
        let setup = || -> io::Result<()> {
            let _restore = RestoreOnDrop(|| restored.set(restored.get() + 1));
            Err(io::Error::other("alternate screen unavailable"))
        };
        assert!(setup().is_err());
        assert_eq!(restored.get(), 1);

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _restore = RestoreOnDrop(|| restored.set(restored.get() + 1));
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert_eq!(restored.get(), 2);
    }

    #[test]
    fn login_masks_the_password() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Tab);
        "secret".chars().for_each(|c| press(&mut app, KeyCode::Char(c)));

        let screen = rendered(&app);
        assert!(screen.contains("Log In"));
        assert!(screen.contains("******"));
        assert!(!screen.contains("secret"));
    }

    fn logged_in_with_tasks(dir: &TempDir, tasks: &str) -> App {
        fs::write(dir.path().join("users.json"), r#"{"alice": "pw1"}"#).unwrap();
        fs::write(dir.path().join("tasks.json"), tasks).unwrap();
        let mut app = app_in(dir);
        "alice".chars().for_each(|c| press(&mut app, KeyCode::Char(c)));
        press(&mut app, KeyCode::Tab);
        "pw1".chars().for_each(|c| press(&mut app, KeyCode::Char(c)));
        press(&mut app, KeyCode::Enter);
        app
    }

    /// Foreground colour of the first cell of `text` on screen.
    fn fg_of(buffer: &Buffer, text: &str) -> Color {
        let symbols: Vec<&str> = buffer.content.iter().map(|cell| cell.symbol()).collect();
        let width = text.chars().count();
        let start = (0..=symbols.len() - width)
            .find(|&i| symbols[i..i + width].concat() == text)
            .unwrap_or_else(|| panic!("{text:?} is not on screen"));
        buffer.content[start].fg
    }

    #[test]
    fn todo_rows_show_labels() {
        let dir = TempDir::new().unwrap();
        let app = logged_in_with_tasks(
            &dir,
            r#"[{"text": "Buy milk", "due_date": "01-01-2026", "priority": "High", "completed": true}]"#,
        );

        let screen = rendered(&app);
        assert!(screen.contains("[X] Buy milk [High Priority] (Due: 01-01-2026)"));
        assert!(screen.contains("Tasks (1)"));
    }

    #[test]
    fn overdue_rows_colour_only_the_due_date() {
        let dir = TempDir::new().unwrap();
        let app = logged_in_with_tasks(
            &dir,
            r#"[{"text": "Essay", "due_date": "01-01-2000", "priority": null, "completed": false}]"#,
        );

        let buffer = buffer(&app);
        assert!(rendered(&app).contains("Essay (Due: 01-01-2000)"));
        assert_eq!(fg_of(&buffer, "Essay"), Color::White);
        assert_eq!(fg_of(&buffer, "(Due: 01-01-2000)"), Color::Red);
    }

    #[test]
    fn password_edits_stay_masked() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Tab);
        "secet".chars().for_each(|c| press(&mut app, KeyCode::Char(c)));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('r'));

        match &app.active {
            ActiveScreen::Login(screen) => assert_eq!(text_of(&screen.password), "secret"),
            other => panic!("unexpected screen {other:?}"),
        }
        assert!(!rendered(&app).contains("secret"));
    }

    #[test]
    fn notice_is_drawn_over_the_screen() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        app.notice = Some("failed to write tasks.json".into());

        let screen = rendered(&app);
        assert!(screen.contains("Storage error"));
        assert!(screen.contains("failed to write tasks.json"));
    }
}
