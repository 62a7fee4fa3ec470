//! The voting countdown window.
//!
//! States: `Active -> Paused` (pause), `Paused -> Active` (resume),
//! `Active -> Expired` once remaining time reaches zero. `Expired` is
//! terminal; only an explicit [`Engagement::set_countdown_window`] starts a
//! new window.

use chrono::{DateTime, Duration, Utc};
use reviewkit_store::{read_json, KvStore, StorageKey};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::engagement::Engagement;
use crate::error::EngageError;
use crate::notice::{Notice, Outcome};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Active,
    Paused,
    Expired,
}

impl std::fmt::Display for CountdownState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountdownState::Active => write!(f, "active"),
            CountdownState::Paused => write!(f, "paused"),
            CountdownState::Expired => write!(f, "expired"),
        }
    }
}

/// Persisted start/end pair plus the pause bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub paused: bool,
    /// Remaining time frozen at pause, in milliseconds.
    #[serde(default)]
    pub remaining_ms: Option<i64>,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
}

impl CountdownWindow {
    /// # Errors
    ///
    /// Returns [`EngageError::InvalidWindow`] unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EngageError> {
        if start >= end {
            return Err(EngageError::InvalidWindow(
                "start date must be before end date".to_string(),
            ));
        }
        Ok(Self {
            start,
            end,
            paused: false,
            remaining_ms: None,
            paused_at: None,
        })
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.end - self.start
    }

    /// Time left at `now`. While paused this is the frozen value.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.paused {
            if let Some(ms) = self.remaining_ms {
                return Duration::milliseconds(ms);
            }
        }
        self.end - now
    }

    #[must_use]
    pub fn state(&self, now: DateTime<Utc>) -> CountdownState {
        if self.paused {
            CountdownState::Paused
        } else if self.remaining(now) <= Duration::zero() {
            CountdownState::Expired
        } else {
            CountdownState::Active
        }
    }

    /// Fraction of the window elapsed, clamped to `[0, 1]`.
    ///
    /// Frozen at the pause instant while paused and pinned at `1.0` once
    /// expired.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let at = match (self.paused, self.paused_at) {
            (true, Some(paused_at)) => paused_at,
            _ => now,
        };
        if self.state(now) == CountdownState::Expired {
            return 1.0;
        }
        let total = self.total().num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let elapsed = (at - self.start).num_milliseconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    fn frame(&self, now: DateTime<Utc>) -> TickFrame {
        match self.state(now) {
            CountdownState::Active => TickFrame::Running(TimeParts::from_duration(self.remaining(now))),
            CountdownState::Paused => TickFrame::Paused(TimeParts::from_duration(self.remaining(now))),
            CountdownState::Expired => TickFrame::Closed,
        }
    }
}

/// Remaining time split for the days/hours/minutes/seconds display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    /// Negative durations clamp to zero.
    #[must_use]
    pub fn from_duration(d: Duration) -> Self {
        let ms = d.num_milliseconds().max(0).unsigned_abs();
        Self {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

impl std::fmt::Display for TimeParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// What the countdown display shows on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFrame {
    Running(TimeParts),
    Paused(TimeParts),
    /// Terminal. The tick loop stops and voting controls are disabled.
    Closed,
}

impl std::fmt::Display for TickFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickFrame::Running(parts) => write!(f, "{parts}"),
            TickFrame::Paused(parts) => write!(f, "COUNTDOWN PAUSED ({parts} left)"),
            TickFrame::Closed => write!(f, "VOTING CLOSED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountdownStatus {
    pub state: CountdownState,
    pub remaining_ms: i64,
    pub parts: TimeParts,
    /// Rounded to two decimals.
    pub progress_percent: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_duration_ms: i64,
}

impl CountdownStatus {
    fn of(window: &CountdownWindow, now: DateTime<Utc>) -> Self {
        let remaining = window.remaining(now);
        Self {
            state: window.state(now),
            remaining_ms: remaining.num_milliseconds(),
            parts: TimeParts::from_duration(remaining),
            progress_percent: (window.progress(now) * 10_000.0).round() / 100.0,
            start: window.start,
            end: window.end,
            total_duration_ms: window.total().num_milliseconds(),
        }
    }
}

fn end_after(start: DateTime<Utc>, length: Duration) -> Result<DateTime<Utc>, EngageError> {
    start
        .checked_add_signed(length)
        .ok_or_else(|| EngageError::InvalidWindow("countdown length out of range".to_string()))
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    /// The stored window, if one was ever created.
    #[must_use]
    pub fn countdown_window(&self) -> Option<CountdownWindow> {
        read_json(&self.store, StorageKey::Countdown)
    }

    /// `true` once the stored window has run out. No window means open.
    #[must_use]
    pub fn voting_closed(&self) -> bool {
        self.countdown_window()
            .is_some_and(|w| w.state(self.clock.now()) == CountdownState::Expired)
    }

    fn ensure_window(&mut self) -> Result<CountdownWindow, EngageError> {
        if let Some(window) = self.countdown_window() {
            return Ok(window);
        }
        let now = self.clock.now();
        let window = CountdownWindow::new(now, end_after(now, self.settings.countdown_default)?)?;
        self.persist(StorageKey::Countdown, &window)?;
        tracing::info!(
            start = %window.start,
            end = %window.end,
            "new countdown window initialized"
        );
        Ok(window)
    }

    /// Load the window, creating the default one on first run.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if a new window cannot be persisted.
    pub fn start_countdown(&mut self) -> Result<CountdownStatus, EngageError> {
        let window = self.ensure_window()?;
        Ok(CountdownStatus::of(&window, self.clock.now()))
    }

    /// Recompute the display for the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if a new window cannot be persisted.
    pub fn countdown_tick(&mut self) -> Result<TickFrame, EngageError> {
        let window = self.ensure_window()?;
        Ok(window.frame(self.clock.now()))
    }

    /// Freeze the countdown. Pausing an already paused countdown changes
    /// nothing; an expired one cannot be paused.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the change cannot be persisted.
    pub fn pause_countdown(&mut self) -> Result<Outcome<Duration>, EngageError> {
        let mut window = self.ensure_window()?;
        let now = self.clock.now();

        match window.state(now) {
            CountdownState::Paused => {
                return Ok(Outcome::Unchanged(Notice::info(
                    "Countdown is already paused.",
                )))
            }
            CountdownState::Expired => {
                return Ok(Outcome::Rejected(Notice::error(
                    "Voting is closed; set a new countdown window first.",
                )))
            }
            CountdownState::Active => {}
        }

        let remaining = window.remaining(now);
        window.paused = true;
        window.remaining_ms = Some(remaining.num_milliseconds());
        window.paused_at = Some(now);
        self.persist(StorageKey::Countdown, &window)?;

        tracing::info!(remaining_secs = remaining.num_seconds(), "countdown paused");
        Ok(Outcome::applied(
            remaining,
            Notice::info(format!(
                "Countdown paused with {} seconds remaining.",
                remaining.num_seconds()
            )),
        ))
    }

    /// Continue a paused countdown: the new end is now plus the frozen
    /// remaining time.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the change cannot be persisted.
    pub fn resume_countdown(&mut self) -> Result<Outcome<DateTime<Utc>>, EngageError> {
        let Some(mut window) = self.countdown_window().filter(|w| w.paused) else {
            return Ok(Outcome::Rejected(Notice::error(
                "Countdown is not currently paused.",
            )));
        };

        let now = self.clock.now();
        let remaining = window.remaining(now);
        window.end = now + remaining;
        window.paused = false;
        window.remaining_ms = None;
        window.paused_at = None;
        self.persist(StorageKey::Countdown, &window)?;

        tracing::info!(end = %window.end, "countdown resumed");
        Ok(Outcome::applied(window.end, Notice::success("Countdown resumed.")))
    }

    /// Replace the window outright. This is the only way out of `Expired`.
    ///
    /// `start` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::InvalidWindow`] if `end` is not in the future
    /// or `start` is not before `end`, and [`EngageError::Store`] if the new
    /// window cannot be persisted.
    pub fn set_countdown_window(
        &mut self,
        end: DateTime<Utc>,
        start: Option<DateTime<Utc>>,
    ) -> Result<CountdownWindow, EngageError> {
        let now = self.clock.now();
        if end <= now {
            return Err(EngageError::InvalidWindow(
                "end date must be in the future".to_string(),
            ));
        }
        let window = CountdownWindow::new(start.unwrap_or(now), end)?;
        self.persist(StorageKey::Countdown, &window)?;
        tracing::info!(
            start = %window.start,
            end = %window.end,
            days = window.total().num_days(),
            "countdown window updated"
        );
        Ok(window)
    }

    /// # Errors
    ///
    /// See [`Engagement::set_countdown_window`].
    pub fn set_countdown_days(&mut self, days: u32) -> Result<CountdownWindow, EngageError> {
        let now = self.clock.now();
        self.set_countdown_window(end_after(now, Duration::days(i64::from(days)))?, Some(now))
    }

    /// # Errors
    ///
    /// See [`Engagement::set_countdown_window`].
    pub fn set_countdown_hours(&mut self, hours: u32) -> Result<CountdownWindow, EngageError> {
        let now = self.clock.now();
        self.set_countdown_window(end_after(now, Duration::hours(i64::from(hours)))?, Some(now))
    }
}

#[cfg(test)]
#[path = "countdown_test.rs"]
mod tests;
