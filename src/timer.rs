//! Countdown timer.
//!
//! The countdown has no thread of its own. The event loop asks how long it
//! may wait for input (`time_until_next_tick`) and then calls `advance`,
//! which emits one tick per elapsed second.
//!
//! ```text
//! Idle -> Running -> Finished
//!           |
//!           +-> Idle (cancel)
//! ```

use std::time::{Duration, Instant};
use tracing::info;

use crate::error::ValidationError;

const TICK: Duration = Duration::from_secs(1);

/// Parses the minutes field: a whole number greater than zero.
pub fn parse_minutes(input: &str) -> Result<u64, ValidationError> {
    match input.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ValidationError::InvalidMinutes),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Remaining(u64),
    Finished,
}

impl Tick {
    pub fn message(&self) -> String {
        match self {
            Tick::Remaining(secs) => format!(
                "Time left: {} minutes {} seconds...",
                secs / 60,
                secs % 60
            ),
            Tick::Finished => "Time's up!".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Countdown {
    state: TimerState,
    remaining_secs: u64,
    next_tick: Option<Instant>,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            remaining_secs: 0,
            next_tick: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Starts counting down from `minutes`. A finished countdown may be
    /// started again; a running one may not.
    pub fn start(&mut self, minutes: u64, now: Instant) -> Result<(), ValidationError> {
        if self.is_running() {
            return Err(ValidationError::TimerRunning);
        }
        self.state = TimerState::Running;
        self.remaining_secs = minutes.saturating_mul(60);
        self.next_tick = Some(now + TICK);
        info!(minutes, "countdown started");
        Ok(())
    }

    pub fn cancel(&mut self) {
        if self.is_running() {
            info!(remaining_secs = self.remaining_secs(), "countdown cancelled");
        }
        self.state = TimerState::Idle;
        self.remaining_secs = 0;
        self.next_tick = None;
    }

    /// Counts one second down.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.is_running() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Finished;
            self.next_tick = None;
            info!("countdown finished");
            Some(Tick::Finished)
        } else {
            Some(Tick::Remaining(self.remaining_secs))
        }
    }

    /// Emits every tick that is due at `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<Tick> {
        let mut ticks = Vec::new();
        while let Some(due) = self.next_tick {
            if due > now {
                break;
            }
            match self.tick() {
                Some(tick) => ticks.push(tick),
                None => break,
            }
            if self.is_running() {
                self.next_tick = Some(due + TICK);
            }
        }
        ticks
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|due| due.saturating_duration_since(now))
    }
}
