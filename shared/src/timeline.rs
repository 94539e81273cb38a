//! Timeline cursor over a fixed window of hours
//!
//! The window bounds never move after [`TimelineWindow::initialize`]. The
//! cursor (and the optional sub-range in range mode) is always kept inside
//! them: free-form setters reject out-of-window input, while the slider and
//! hour-step helpers clamp or do nothing. Every mutator reports whether the
//! window actually changed so the caller knows whether to refresh polygons.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Default half-width of the window, in days
pub const DEFAULT_WINDOW_DAYS: i64 = 15;

/// Largest supported distance of either window bound from "now", in days
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Format of hour keys in weather series, e.g. `2024-03-01T13:00`
pub const HOUR_KEY_FORMAT: &str = "%Y-%m-%dT%H:00";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMode {
    #[default]
    Point,
    Range,
}

/// Sub-interval of the window used in range mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Label under the slider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tick {
    /// Offset from the window start, in hours
    pub value: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "RawWindow")]
pub struct TimelineWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    current: DateTime<Utc>,
    mode: TimelineMode,
    range: Option<TimeRange>,
}

/// Unchecked wire form of [`TimelineWindow`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    current: DateTime<Utc>,
    #[serde(default)]
    mode: TimelineMode,
    range: Option<TimeRange>,
}

impl TryFrom<RawWindow> for TimelineWindow {
    type Error = DomainError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        if raw.start > raw.end {
            return Err(DomainError::InvariantViolation(format!(
                "timeline start {} is after end {}",
                raw.start, raw.end
            )));
        }

        let mut window = Self {
            start: raw.start,
            end: raw.end,
            current: raw.start,
            mode: TimelineMode::Point,
            range: None,
        };
        window.set_current(raw.current)?;
        if let Some(range) = raw.range {
            window.set_range(range.start, range.end)?;
        }
        window.set_mode(raw.mode);
        Ok(window)
    }
}

impl TimelineWindow {
    /// Window of `[now - before_days, now + after_days]` with the cursor at `now`.
    ///
    /// Day counts are clamped to `[0, MAX_WINDOW_DAYS]`.
    pub fn initialize(now: DateTime<Utc>, before_days: i64, after_days: i64) -> Self {
        let before = Duration::days(before_days.clamp(0, MAX_WINDOW_DAYS));
        let after = Duration::days(after_days.clamp(0, MAX_WINDOW_DAYS));
        Self {
            start: now.checked_sub_signed(before).unwrap_or(now),
            end: now.checked_add_signed(after).unwrap_or(now),
            current: now,
            mode: TimelineMode::Point,
            range: None,
        }
    }

    /// The default ±15 day window around `now`
    pub fn around(now: DateTime<Utc>) -> Self {
        Self::initialize(now, DEFAULT_WINDOW_DAYS, DEFAULT_WINDOW_DAYS)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn current(&self) -> DateTime<Utc> {
        self.current
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn range(&self) -> Option<TimeRange> {
        self.range
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t <= self.end
    }

    /// Move the cursor. Rejects times outside the window.
    pub fn set_current(&mut self, new_current: DateTime<Utc>) -> DomainResult<bool> {
        if !self.contains(new_current) {
            return Err(DomainError::OutOfBounds {
                requested: new_current,
                start: self.start,
                end: self.end,
            });
        }
        let changed = self.current != new_current;
        self.current = new_current;
        Ok(changed)
    }

    /// Move the cursor one hour; does nothing if that would leave the window
    pub fn step_hour(&mut self, direction: StepDirection) -> bool {
        let delta = match direction {
            StepDirection::Prev => Duration::hours(-1),
            StepDirection::Next => Duration::hours(1),
        };
        let target = self.current + delta;
        if !self.contains(target) {
            return false;
        }
        self.current = target;
        true
    }

    /// Slider input: hours since window start, clamped to `[0, total_hours]`
    pub fn set_from_slider(&mut self, hours: i64) -> bool {
        let hours = hours.clamp(0, self.total_hours());
        let target = (self.start + Duration::hours(hours)).min(self.end);
        let changed = self.current != target;
        self.current = target;
        changed
    }

    /// Set the range-mode sub-interval; requires `start <= range_start <= range_end <= end`
    pub fn set_range(
        &mut self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> DomainResult<bool> {
        if range_start < self.start || range_start > range_end || range_end > self.end {
            return Err(DomainError::InvalidRange {
                range_start,
                range_end,
                start: self.start,
                end: self.end,
            });
        }
        let range = TimeRange {
            start: range_start,
            end: range_end,
        };
        let changed = self.range != Some(range) || self.mode != TimelineMode::Range;
        self.range = Some(range);
        self.mode = TimelineMode::Range;
        Ok(changed)
    }

    /// Switch mode. Entering range mode without a range starts at `[current, current]`.
    pub fn set_mode(&mut self, mode: TimelineMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        if mode == TimelineMode::Range && self.range.is_none() {
            self.range = Some(TimeRange {
                start: self.current,
                end: self.current,
            });
        }
        true
    }

    /// Drop the sub-range and return to point mode
    pub fn clear_range(&mut self) -> bool {
        let changed = self.range.is_some() || self.mode != TimelineMode::Point;
        self.range = None;
        self.mode = TimelineMode::Point;
        changed
    }

    /// Range used for queries: `Some` only in range mode
    pub fn active_range(&self) -> Option<TimeRange> {
        match self.mode {
            TimelineMode::Range => self.range,
            TimelineMode::Point => None,
        }
    }

    pub fn total_hours(&self) -> i64 {
        (self.end - self.start).num_hours()
    }

    pub fn current_offset_hours(&self) -> i64 {
        (self.current - self.start).num_hours()
    }

    /// Series key of the cursor's hour
    pub fn hour_key(&self) -> String {
        hour_key(self.current)
    }

    /// Roughly `count` evenly spaced slider labels formatted `MMM dd HH:mm`
    pub fn ticks(&self, count: i64) -> Vec<Tick> {
        let total = self.total_hours();
        let interval = (total / count.max(1)).max(1);

        (0..=total)
            .step_by(interval as usize)
            .map(|value| Tick {
                value,
                label: (self.start + Duration::hours(value))
                    .format("%b %d %H:%M")
                    .to_string(),
            })
            .collect()
    }
}

/// Format a time as an hourly series key (minutes truncated)
pub fn hour_key(t: DateTime<Utc>) -> String {
    t.format(HOUR_KEY_FORMAT).to_string()
}
