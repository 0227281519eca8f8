// src/window.rs
use crate::model::CalendarDate;
use crate::throttle::CoalescingTimer;
use chrono::{Datelike, Duration};
use std::time::{Duration as StdDuration, Instant};
use tracing::debug;

pub const DAYS_PER_WEEK: usize = 7;
pub const DEFAULT_WEEKS_BACK: u32 = 5;
pub const DEFAULT_WEEKS_FORWARD: u32 = 5;
/// Upper bound for the configured weeks on either side of the centre.
pub const MAX_CONFIGURED_WEEKS: u32 = 520;

/// Monday of the week containing `date` (Monday = offset 0).
pub fn monday_of(date: CalendarDate) -> CalendarDate {
    date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_monday(),
    )))
    .unwrap_or(date)
}

/// Contiguous run of whole weeks starting on a Monday.
///
/// Stored as a start date plus a week count, so gaps, duplicates and
/// misalignment cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: CalendarDate,
    weeks: usize,
}

impl DateWindow {
    /// Window of `weeks_back` weeks before the week of `center` and `weeks_forward` after it.
    ///
    /// Both counts are capped at `MAX_CONFIGURED_WEEKS`; if the start would fall
    /// before the earliest representable date the window begins at `center`'s week.
    pub fn initialize(center: CalendarDate, weeks_back: u32, weeks_forward: u32) -> Self {
        let weeks_back = weeks_back.min(MAX_CONFIGURED_WEEKS);
        let weeks_forward = weeks_forward.min(MAX_CONFIGURED_WEEKS);
        let monday = monday_of(center);
        let (start, weeks_back) =
            match monday.checked_sub_signed(Duration::weeks(i64::from(weeks_back))) {
                Some(start) => (start, weeks_back),
                None => (monday, 0),
            };
        Self {
            start,
            weeks: weeks_back as usize + weeks_forward as usize + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.weeks * DAYS_PER_WEEK
    }

    pub fn is_empty(&self) -> bool {
        self.weeks == 0
    }

    pub fn weeks(&self) -> usize {
        self.weeks
    }

    pub fn first(&self) -> CalendarDate {
        self.start
    }

    pub fn last(&self) -> CalendarDate {
        self.start + Duration::days(self.len() as i64 - 1)
    }

    pub fn get(&self, index: usize) -> Option<CalendarDate> {
        (index < self.len()).then(|| self.start + Duration::days(index as i64))
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        date >= self.first() && date <= self.last()
    }

    pub fn position(&self, date: CalendarDate) -> Option<usize> {
        self.contains(date)
            .then(|| (date - self.start).num_days() as usize)
    }

    /// Row (week) index holding `date`.
    pub fn week_of(&self, date: CalendarDate) -> Option<usize> {
        self.position(date).map(|p| p / DAYS_PER_WEEK)
    }

    pub fn iter(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        (0..self.len()).map(move |i| self.start + Duration::days(i as i64))
    }

    pub fn to_vec(&self) -> Vec<CalendarDate> {
        self.iter().collect()
    }

    pub fn week_row(&self, week: usize) -> Option<[CalendarDate; DAYS_PER_WEEK]> {
        if week >= self.weeks {
            return None;
        }
        let monday = self.start + Duration::weeks(week as i64);
        Some(std::array::from_fn(|d| monday + Duration::days(d as i64)))
    }

    pub fn week_rows(&self) -> impl Iterator<Item = [CalendarDate; DAYS_PER_WEEK]> + '_ {
        (0..self.weeks).filter_map(move |w| self.week_row(w))
    }

    fn prepend_week(&mut self) -> bool {
        match self.start.checked_sub_signed(Duration::weeks(1)) {
            Some(start) => {
                self.start = start;
                self.weeks += 1;
                true
            }
            None => false,
        }
    }

    fn append_week(&mut self) {
        self.weeks += 1;
    }
}

/// One-shot guard for the first centering scroll after mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialScroll {
    Pending,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    fn threshold(&self) -> f64 {
        self.client_height / 4.0
    }

    pub fn near_top(&self) -> bool {
        self.scroll_top < self.threshold()
    }

    pub fn near_bottom(&self) -> bool {
        self.scroll_top + self.client_height > self.scroll_height - self.threshold()
    }
}

/// Scroll correction owed after content was prepended above the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorCompensation {
    pub scroll_top_before: f64,
    pub scroll_height_before: f64,
}

impl AnchorCompensation {
    /// The scroll offset that keeps the same content under the viewport,
    /// assuming the viewport has not moved since the sample was taken.
    pub fn apply(&self, new_scroll_height: f64) -> f64 {
        self.apply_to(self.scroll_top_before, new_scroll_height)
    }

    /// Shifts the live `scroll_top` by the height added above it. Use this when
    /// the view may have scrolled after the sample that triggered the expansion.
    pub fn apply_to(&self, current_scroll_top: f64, new_scroll_height: f64) -> f64 {
        current_scroll_top + (new_scroll_height - self.scroll_height_before)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Expansion {
    pub backward: Option<AnchorCompensation>,
    pub forward: bool,
}

impl Expansion {
    pub fn is_empty(&self) -> bool {
        self.backward.is_none() && !self.forward
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekStep {
    Back,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// The date was outside the window; it was rebuilt around it.
    Recentered(CalendarDate),
    /// The date is already rendered; scroll to it without touching the window.
    ScrollTo(CalendarDate),
}

pub struct WindowManager {
    window: DateWindow,
    center: CalendarDate,
    weeks_back: u32,
    weeks_forward: u32,
    initial_scroll: InitialScroll,
    scroll_target: Option<CalendarDate>,
    throttle: CoalescingTimer<ScrollMetrics>,
    mounted: bool,
}

impl WindowManager {
    pub fn new(
        center: CalendarDate,
        weeks_back: u32,
        weeks_forward: u32,
        throttle_interval: StdDuration,
    ) -> Self {
        Self {
            window: DateWindow::initialize(center, weeks_back, weeks_forward),
            center,
            weeks_back,
            weeks_forward,
            initial_scroll: InitialScroll::Pending,
            scroll_target: Some(center),
            throttle: CoalescingTimer::new(throttle_interval),
            mounted: true,
        }
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn center(&self) -> CalendarDate {
        self.center
    }

    pub fn initial_scroll_state(&self) -> InitialScroll {
        self.initial_scroll
    }

    /// Replaces the window around `center` and asks the view to scroll to it.
    pub fn recenter(&mut self, center: CalendarDate) {
        self.center = center;
        self.window = DateWindow::initialize(center, self.weeks_back, self.weeks_forward);
        self.scroll_target = Some(center);
        self.throttle.cancel();
        debug!(%center, first = %self.window.first(), "date window recentered");
    }

    pub fn shift_week(&mut self, step: WeekStep) {
        let delta = match step {
            WeekStep::Back => -7,
            WeekStep::Forward => 7,
        };
        self.recenter(self.center + Duration::days(delta));
    }

    pub fn go_to_today(&mut self, today: CalendarDate) {
        self.recenter(today);
    }

    /// Date picker selection: recenter if outside the window, otherwise scroll only.
    pub fn pick(&mut self, date: CalendarDate) -> PickOutcome {
        if self.window.contains(date) {
            self.scroll_target = Some(date);
            // A sample taken before the jump must not expand or re-anchor afterwards.
            self.throttle.cancel();
            PickOutcome::ScrollTo(date)
        } else {
            self.recenter(date);
            PickOutcome::Recentered(date)
        }
    }

    /// Pending "scroll this date into view" request, consumed once rendered.
    pub fn take_scroll_target(&mut self) -> Option<CalendarDate> {
        self.scroll_target.take()
    }

    /// Offset that centres the window in the viewport, returned once per mount.
    pub fn initial_scroll(&mut self, metrics: ScrollMetrics) -> Option<f64> {
        match self.initial_scroll {
            InitialScroll::Pending if self.mounted && !self.window.is_empty() => {
                self.initial_scroll = InitialScroll::Done;
                Some(((metrics.scroll_height - metrics.client_height) / 2.0).max(0.0))
            }
            _ => None,
        }
    }

    /// Prepends the week before the current first date. Returns the number of days added.
    pub fn expand_backward(&mut self) -> usize {
        if !self.window.prepend_week() {
            return 0;
        }
        debug!(first = %self.window.first(), "date window expanded backward");
        DAYS_PER_WEEK
    }

    /// Appends the week after the current last date. Returns the number of days added.
    pub fn expand_forward(&mut self) -> usize {
        self.window.append_week();
        debug!(last = %self.window.last(), "date window expanded forward");
        DAYS_PER_WEEK
    }

    /// Applies the edge-proximity policy to one scroll sample.
    pub fn evaluate(&mut self, metrics: ScrollMetrics) -> Expansion {
        let mut expansion = Expansion::default();
        if metrics.near_top() && self.expand_backward() > 0 {
            expansion.backward = Some(AnchorCompensation {
                scroll_top_before: metrics.scroll_top,
                scroll_height_before: metrics.scroll_height,
            });
        }
        if metrics.near_bottom() {
            self.expand_forward();
            expansion.forward = true;
        }
        expansion
    }

    pub fn on_scroll(&mut self, now: Instant, metrics: ScrollMetrics) {
        if self.mounted {
            self.throttle.schedule(now, metrics);
        }
    }

    /// Runs the throttled evaluation if one is due.
    pub fn poll_scroll(&mut self, now: Instant) -> Option<Expansion> {
        if !self.mounted {
            return None;
        }
        let metrics = self.throttle.poll(now)?;
        Some(self.evaluate(metrics))
    }

    pub fn time_until_scroll_eval(&self, now: Instant) -> Option<StdDuration> {
        self.throttle.time_until_due(now)
    }

    pub fn teardown(&mut self) {
        self.mounted = false;
        self.throttle.cancel();
    }
}
