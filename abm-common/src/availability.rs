//! Artist availability: blocked dates and date selection
//!
//! One [`AvailabilityCalendar`] per artist backs both the admin
//! artist-management screen and the public booking page. It owns:
//!
//! - the [`BlockedDateSet`]: calendar days the artist cannot be booked
//! - a [`RangeSelection`]: the operator's pending pick, in single
//!   (free multi-select) or range (start click, end click) mode
//!
//! Blocked days are disabled for selection; a day must be unblocked before
//! it can be picked again.
//!
//! Range mode state machine:
//!
//! ```text
//!   Idle --select(d)--> AwaitingEnd(d)      selected = [d]
//!   AwaitingEnd(s) --select(d)--> Idle      selected = min(s,d)..=max(s,d)
//!   AwaitingEnd(s) --select(d)--> AwaitingEnd(s)   span > MAX_RANGE_DAYS
//!   any --toggle range mode--> Idle         selected = []
//! ```

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::time::{days_between, CalendarDay};

/// Longest span, in days, a single range pick may cover
pub const MAX_RANGE_DAYS: usize = 366;

/// Set of blocked calendar days, kept sorted, never duplicated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockedDateSet {
    dates: BTreeSet<NaiveDate>,
}

impl BlockedDateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any day-like values; times of day are dropped
    pub fn from_dates<D: CalendarDay>(dates: impl IntoIterator<Item = D>) -> Self {
        Self {
            dates: dates.into_iter().map(|d| d.calendar_day()).collect(),
        }
    }

    pub fn contains(&self, date: &impl CalendarDay) -> bool {
        self.dates.contains(&date.calendar_day())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Blocked days in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }

    /// Insert the days that are not blocked yet, returning those days
    /// (ascending, deduplicated)
    pub fn insert_new(&mut self, dates: &[NaiveDate]) -> Vec<NaiveDate> {
        let fresh: BTreeSet<NaiveDate> = dates
            .iter()
            .copied()
            .filter(|d| !self.dates.contains(d))
            .collect();
        self.dates.extend(fresh.iter().copied());
        fresh.into_iter().collect()
    }

    /// Unblock one calendar day; false if it was not blocked
    pub fn remove(&mut self, date: &impl CalendarDay) -> bool {
        self.dates.remove(&date.calendar_day())
    }

    /// Unblock everything, returning how many days were blocked
    pub fn clear(&mut self) -> usize {
        let count = self.dates.len();
        self.dates.clear();
        count
    }

    /// Blocked days grouped by month, months and days ascending
    pub fn group_by_month(&self) -> Vec<MonthGroup> {
        let mut groups: Vec<MonthGroup> = Vec::new();
        for date in &self.dates {
            match groups.last_mut() {
                Some(group) if group.year == date.year() && group.month == date.month() => {
                    group.dates.push(*date);
                }
                _ => groups.push(MonthGroup {
                    year: date.year(),
                    month: date.month(),
                    dates: vec![*date],
                }),
            }
        }
        groups
    }
}

/// Blocked days falling in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGroup {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub dates: Vec<NaiveDate>,
}

impl MonthGroup {
    /// e.g. "March 2024"
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => first.format("%B %Y").to_string(),
            None => format!("{}-{:02}", self.year, self.month),
        }
    }
}

/// Selection mode of the calendar picker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// Free multi-select: each pick toggles one day
    #[default]
    Single,
    /// Contiguous span picked with a start click and an end click
    Range,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Single => f.write_str("single"),
            SelectionMode::Range => f.write_str("range"),
        }
    }
}

/// Range mode phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePhase {
    #[default]
    Idle,
    AwaitingEnd(NaiveDate),
}

/// Result of picking a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SelectOutcome {
    /// Single mode: day added to the selection
    Selected,
    /// Single mode: day was selected and has been removed
    Deselected,
    /// Range mode: start chosen, waiting for the end
    RangeStarted,
    /// Range mode: span filled in
    RangeCompleted { days: usize },
    /// Range mode: end pick refused, the start is kept
    RangeTooLong { days: usize },
    /// Day is blocked; nothing changed
    Disabled,
}

/// Pending selection of the calendar picker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSelection {
    mode: SelectionMode,
    phase: RangePhase,
    selected: Vec<NaiveDate>,
}

impl RangeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_range_mode(&self) -> bool {
        self.mode == SelectionMode::Range
    }

    pub fn phase(&self) -> RangePhase {
        self.phase
    }

    pub fn range_start(&self) -> Option<NaiveDate> {
        match self.phase {
            RangePhase::AwaitingEnd(start) => Some(start),
            RangePhase::Idle => None,
        }
    }

    pub fn is_selecting_range(&self) -> bool {
        matches!(self.phase, RangePhase::AwaitingEnd(_))
    }

    /// Selected days, ascending
    pub fn selected_dates(&self) -> &[NaiveDate] {
        &self.selected
    }

    /// Switch mode; always drops the pending selection
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        self.reset();
    }

    /// Flip between single and range mode, returning the new mode
    pub fn toggle_mode(&mut self) -> SelectionMode {
        let next = match self.mode {
            SelectionMode::Single => SelectionMode::Range,
            SelectionMode::Range => SelectionMode::Single,
        };
        self.set_mode(next);
        next
    }

    /// Empty the selection and return to Idle (mode unchanged)
    pub fn reset(&mut self) {
        self.selected.clear();
        self.phase = RangePhase::Idle;
    }

    /// Apply one pick
    ///
    /// Does not know about blocked days; see [`AvailabilityCalendar::select`].
    pub fn pick(&mut self, date: impl CalendarDay) -> SelectOutcome {
        let date = date.calendar_day();
        match (self.mode, self.phase) {
            (SelectionMode::Single, _) => match self.selected.binary_search(&date) {
                Ok(index) => {
                    self.selected.remove(index);
                    SelectOutcome::Deselected
                }
                Err(index) => {
                    self.selected.insert(index, date);
                    SelectOutcome::Selected
                }
            },
            (SelectionMode::Range, RangePhase::Idle) => {
                self.phase = RangePhase::AwaitingEnd(date);
                self.selected = vec![date];
                SelectOutcome::RangeStarted
            }
            (SelectionMode::Range, RangePhase::AwaitingEnd(start)) => {
                let span = usize::try_from((date - start).num_days().unsigned_abs())
                    .map_or(usize::MAX, |d| d.saturating_add(1));
                if span > MAX_RANGE_DAYS {
                    debug!(%start, end = %date, span, "Range pick refused: span too long");
                    return SelectOutcome::RangeTooLong { days: span };
                }
                self.selected = days_between(start, date);
                self.phase = RangePhase::Idle;
                SelectOutcome::RangeCompleted {
                    days: self.selected.len(),
                }
            }
        }
    }

    /// Serializable view of the selection state
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            is_range_mode: self.is_range_mode(),
            range_start: self.range_start(),
            is_selecting_range: self.is_selecting_range(),
            selected_dates: self.selected.clone(),
        }
    }
}

/// Flat selection state as exchanged with views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub is_range_mode: bool,
    pub range_start: Option<NaiveDate>,
    pub is_selecting_range: bool,
    pub selected_dates: Vec<NaiveDate>,
}

/// Result of committing the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BlockOutcome {
    /// These days were newly blocked (ascending)
    Blocked { dates: Vec<NaiveDate> },
    /// Every selected day was already blocked (or nothing was selected)
    NoChanges,
}

/// Blocked days plus the pending selection for one artist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityCalendar {
    blocked: BlockedDateSet,
    selection: RangeSelection,
}

impl AvailabilityCalendar {
    pub fn new(blocked: BlockedDateSet) -> Self {
        Self {
            blocked,
            selection: RangeSelection::new(),
        }
    }

    pub fn blocked(&self) -> &BlockedDateSet {
        &self.blocked
    }

    pub fn selection(&self) -> &RangeSelection {
        &self.selection
    }

    /// A day is disabled for selection iff it is blocked
    pub fn is_disabled(&self, date: &impl CalendarDay) -> bool {
        self.blocked.contains(date)
    }

    /// A day can be booked iff it is not blocked
    pub fn is_available(&self, date: &impl CalendarDay) -> bool {
        !self.is_disabled(date)
    }

    /// Pick a day, refusing blocked ones
    pub fn select(&mut self, date: impl CalendarDay) -> SelectOutcome {
        let date = date.calendar_day();
        if self.is_disabled(&date) {
            debug!(%date, "Selection refused: date is blocked");
            return SelectOutcome::Disabled;
        }
        self.selection.pick(date)
    }

    /// Flip range mode, returning the new mode
    pub fn toggle_range_mode(&mut self) -> SelectionMode {
        self.selection.toggle_mode()
    }

    pub fn set_range_mode(&mut self, enabled: bool) {
        let mode = if enabled {
            SelectionMode::Range
        } else {
            SelectionMode::Single
        };
        self.selection.set_mode(mode);
    }

    pub fn clear_selection(&mut self) {
        self.selection.reset();
    }

    /// Commit the selection to the blocked set
    ///
    /// Days already blocked are skipped. The selection is cleared in every
    /// case, including when nothing new was blocked.
    pub fn block_dates(&mut self) -> BlockOutcome {
        let fresh = self.blocked.insert_new(self.selection.selected_dates());
        self.selection.reset();

        if fresh.is_empty() {
            debug!("Block commit: no new dates");
            BlockOutcome::NoChanges
        } else {
            debug!(count = fresh.len(), "Block commit");
            BlockOutcome::Blocked { dates: fresh }
        }
    }

    /// Unblock one day; false when it was not blocked
    pub fn remove_blocked_date(&mut self, date: impl CalendarDay) -> bool {
        self.blocked.remove(&date)
    }

    /// Unblock every day, returning how many were blocked
    pub fn clear_all_blocked_dates(&mut self) -> usize {
        self.blocked.clear()
    }
}
