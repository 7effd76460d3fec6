//! Countdown timer driven by per-frame ticks.
//!
//! The timer counts `remaining` down from a configured duration while running.
//! Each run carries a list of integer milestones (`top_milestone` down to 1);
//! every milestone is announced once, in descending order, as soon as
//! `remaining` drops to or below it. Reaching zero stops the timer and fires
//! the completion listeners on the same tick.

use crate::config::{ConfigValidator, DisplayMode, TimerConfig};
use crate::error::{Error, Result};
use crate::timer::display::{format_remaining, DisplayPort};
use crate::timer::listeners::{ListenerId, Listeners};

/// Lifecycle state of a [`CountdownTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Stopped => "stopped",
        }
    }
}

/// A single countdown with milestone and completion notifications.
///
/// Listeners are called synchronously from inside [`tick`](Self::tick) or
/// [`stop`](Self::stop) and must not call back into the same timer.
pub struct CountdownTimer {
    total_duration: f64,
    remaining: f64,
    last_stopped_remaining: f64,
    state: TimerState,
    top_milestone: u32,
    /// Highest milestone not yet announced in this run; 0 when none remain.
    next_milestone: u32,
    display: Option<Box<dyn DisplayPort>>,
    display_mode: DisplayMode,
    countdown_mode: bool,
    ready_text: String,
    milestone_listeners: Listeners<u32>,
    completion_listeners: Listeners<()>,
    next_listener_id: u64,
}

impl CountdownTimer {
    /// Creates an idle timer with default display settings and milestones from 3.
    pub fn new(duration: f64) -> Result<Self> {
        Self::from_config(duration, &TimerConfig::default())
    }

    /// Creates an idle timer configured from `config`.
    pub fn from_config(duration: f64, config: &TimerConfig) -> Result<Self> {
        validate_duration(duration)?;
        ConfigValidator::new().validate_timer(config)?;

        Ok(Self {
            total_duration: duration,
            remaining: 0.0,
            last_stopped_remaining: 0.0,
            state: TimerState::Idle,
            top_milestone: config.top_milestone,
            next_milestone: 0,
            display: None,
            display_mode: config.display_mode,
            countdown_mode: config.countdown_mode,
            ready_text: config.ready_text.clone(),
            milestone_listeners: Listeners::new(),
            completion_listeners: Listeners::new(),
            next_listener_id: 0,
        })
    }

    /// Attaches a display that receives the formatted remaining time every running tick.
    pub fn set_display(&mut self, display: Box<dyn DisplayPort>) {
        self.display = Some(display);
    }

    /// Detaches the display, if any.
    pub fn clear_display(&mut self) {
        self.display = None;
    }

    /// Registers a callback invoked with each milestone value as it is crossed.
    pub fn on_milestone<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(u32) + 'static,
    {
        let id = self.allocate_listener_id();
        self.milestone_listeners.add(id, Box::new(callback));
        id
    }

    /// Registers a callback invoked when the countdown completes.
    pub fn on_complete<F>(&mut self, mut callback: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        let id = self.allocate_listener_id();
        self.completion_listeners
            .add(id, Box::new(move |()| callback()));
        id
    }

    /// Removes a milestone or completion listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.milestone_listeners.remove(id) || self.completion_listeners.remove(id)
    }

    /// Number of registered milestone and completion listeners.
    pub fn listener_count(&self) -> usize {
        self.milestone_listeners.len() + self.completion_listeners.len()
    }

    fn allocate_listener_id(&mut self) -> ListenerId {
        let id = ListenerId::new(self.next_listener_id);
        self.next_listener_id += 1;
        id
    }

    /// Sets the duration used by the next [`restart`](Self::restart).
    ///
    /// Ignored while the timer is running.
    pub fn set_duration(&mut self, duration: f64) -> Result<()> {
        validate_duration(duration)?;

        if self.state == TimerState::Running {
            tracing::debug!(
                "Ignoring set_duration({}) while running ({}s left)",
                duration,
                self.remaining
            );
            return Ok(());
        }

        self.total_duration = duration;
        Ok(())
    }

    /// Resets `remaining` to the full duration and starts a fresh run.
    pub fn restart(&mut self) {
        self.remaining = self.total_duration;
        self.next_milestone = self.top_milestone;
        self.state = TimerState::Running;
        tracing::info!(
            "Countdown restarted: {}s, milestones from {}",
            self.total_duration,
            self.top_milestone
        );
    }

    /// Continues counting from the current `remaining`.
    ///
    /// From `Paused` the pending milestones are kept. From `Idle` or `Stopped`
    /// a new run begins whose milestones are those still below `remaining`.
    pub fn resume(&mut self) {
        match self.state {
            TimerState::Running => {
                tracing::debug!("Ignoring resume: countdown already running");
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                tracing::debug!("Countdown resumed at {}s", self.remaining);
            }
            TimerState::Idle | TimerState::Stopped => {
                let remaining = self.remaining;
                // Highest integer strictly below `remaining`.
                let below = (remaining.ceil() - 1.0).max(0.0);
                self.next_milestone = if below >= f64::from(self.top_milestone) {
                    self.top_milestone
                } else {
                    below as u32
                };
                self.state = TimerState::Running;
                tracing::debug!("Countdown started from {}s without reset", remaining);
            }
        }
    }

    /// Suspends counting, preserving `remaining` and pending milestones.
    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            tracing::debug!("Ignoring pause in state {}", self.state.as_str());
            return;
        }
        self.state = TimerState::Paused;
        tracing::debug!("Countdown paused at {}s", self.remaining);
    }

    /// Stops the timer, zeroing `remaining` and clearing the display.
    ///
    /// The time left at the moment of stopping stays readable through
    /// [`time_left`](Self::time_left). When `invoke_completion` is true the
    /// completion listeners fire even if the countdown had not finished.
    pub fn stop(&mut self, invoke_completion: bool) {
        self.last_stopped_remaining = self.remaining;
        self.remaining = 0.0;
        self.next_milestone = 0;
        self.state = TimerState::Stopped;
        self.show("");

        tracing::info!(
            "Countdown stopped with {}s left (completion: {})",
            self.last_stopped_remaining,
            invoke_completion
        );

        if invoke_completion {
            self.completion_listeners.emit(());
        }
    }

    /// Advances the countdown by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        if self.state != TimerState::Running {
            return;
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.remaining = (self.remaining - dt).max(0.0);

        // A large step can cross several thresholds at once; announce each in order.
        while self.next_milestone > 0 && self.remaining <= f64::from(self.next_milestone) {
            let milestone = self.next_milestone;
            self.next_milestone -= 1;
            tracing::debug!("Countdown milestone {}", milestone);
            self.milestone_listeners.emit(milestone);
        }

        self.refresh_display();

        if self.remaining <= 0.0 {
            self.stop(true);
        }
    }

    /// Time left in the current run, or the time left when the timer was last stopped.
    pub fn time_left(&self) -> f64 {
        match self.state {
            TimerState::Running | TimerState::Paused => self.remaining,
            TimerState::Idle | TimerState::Stopped => self.last_stopped_remaining,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Milestones not yet announced in the current run, highest first.
    pub fn pending_milestones(&self) -> Vec<u32> {
        (1..=self.next_milestone).rev().collect()
    }

    /// The text the display would show for the current `remaining`.
    pub fn formatted(&self) -> String {
        let text = format_remaining(self.remaining, self.display_mode);
        if self.countdown_mode && text == "0" {
            self.ready_text.clone()
        } else {
            text
        }
    }

    fn refresh_display(&mut self) {
        if self.display.is_some() {
            let text = self.formatted();
            self.show(&text);
        }
    }

    fn show(&mut self, text: &str) {
        if let Some(display) = self.display.as_mut() {
            display.show(text);
        }
    }
}

fn validate_duration(duration: f64) -> Result<()> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(Error::InvalidDuration(duration));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Milestone(u32),
        Complete,
    }

    fn recording_timer(duration: f64, top_milestone: u32) -> (CountdownTimer, Rc<RefCell<Vec<Event>>>) {
        let config = TimerConfig {
            top_milestone,
            ..TimerConfig::default()
        };
        let mut timer = CountdownTimer::from_config(duration, &config).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&events);
        timer.on_milestone(move |m| sink.borrow_mut().push(Event::Milestone(m)));
        let sink = Rc::clone(&events);
        timer.on_complete(move || sink.borrow_mut().push(Event::Complete));

        (timer, events)
    }

    #[test]
    fn test_new_timer_is_idle() {
        let timer = CountdownTimer::new(5.0).unwrap();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.time_left(), 0.0);
        assert_eq!(timer.total_duration(), 5.0);
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert!(matches!(CountdownTimer::new(-1.0), Err(Error::InvalidDuration(_))));
        let mut timer = CountdownTimer::new(1.0).unwrap();
        assert!(timer.set_duration(f64::NAN).is_err());
        assert_eq!(timer.total_duration(), 1.0);
    }

    #[test]
    fn test_single_large_tick_drains_everything() {
        for (duration, top) in [(0.0, 0), (0.0, 3), (2.0, 3), (5.5, 4), (10.0, 10), (3.0, 7)] {
            let (mut timer, events) = recording_timer(duration, top);
            timer.restart();
            timer.tick(duration);

            assert_eq!(timer.time_left(), 0.0);
            assert_eq!(timer.state(), TimerState::Stopped);

            let mut expected: Vec<Event> = (1..=top).rev().map(Event::Milestone).collect();
            expected.push(Event::Complete);
            assert_eq!(*events.borrow(), expected, "duration {} top {}", duration, top);
        }
    }

    #[test]
    fn test_three_second_countdown_in_one_second_steps() {
        let (mut timer, events) = recording_timer(3.0, 3);
        timer.restart();

        timer.tick(1.0);
        assert_eq!(*events.borrow(), vec![Event::Milestone(3), Event::Milestone(2)]);

        timer.tick(1.0);
        assert_eq!(events.borrow().last(), Some(&Event::Milestone(1)));
        assert!(timer.is_running());

        timer.tick(1.0);
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Milestone(3),
                Event::Milestone(2),
                Event::Milestone(1),
                Event::Complete
            ]
        );
        assert_eq!(timer.time_left(), 0.0);
    }

    #[test]
    fn test_small_ticks_cross_each_milestone_once() {
        let (mut timer, events) = recording_timer(3.5, 3);
        timer.restart();

        for _ in 0..400 {
            timer.tick(0.01);
        }

        let milestones: Vec<Event> = events
            .borrow()
            .iter()
            .copied()
            .filter(|e| matches!(e, Event::Milestone(_)))
            .collect();
        assert_eq!(
            milestones,
            vec![Event::Milestone(3), Event::Milestone(2), Event::Milestone(1)]
        );
        assert_eq!(
            events.borrow().iter().filter(|e| **e == Event::Complete).count(),
            1
        );
    }

    #[test]
    fn test_pause_is_idempotent() {
        let (mut timer, _events) = recording_timer(10.0, 3);
        timer.restart();
        timer.tick(2.5);

        timer.pause();
        let left = timer.time_left();
        let pending = timer.pending_milestones();

        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.time_left(), left);
        assert_eq!(timer.pending_milestones(), pending);
    }

    #[test]
    fn test_paused_timer_ignores_ticks() {
        let (mut timer, events) = recording_timer(4.0, 3);
        timer.restart();
        timer.pause();
        timer.tick(10.0);

        assert_relative_eq!(timer.time_left(), 4.0);
        assert!(events.borrow().is_empty());

        timer.resume();
        timer.tick(1.5);
        assert_relative_eq!(timer.time_left(), 2.5);
        assert_eq!(*events.borrow(), vec![Event::Milestone(3)]);
    }

    #[test]
    fn test_resume_keeps_pending_milestones() {
        let (mut timer, events) = recording_timer(5.0, 3);
        timer.restart();
        timer.tick(2.5);
        assert_eq!(*events.borrow(), vec![Event::Milestone(3)]);

        timer.pause();
        timer.resume();
        assert_eq!(timer.pending_milestones(), vec![2, 1]);

        timer.tick(2.5);
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Milestone(3),
                Event::Milestone(2),
                Event::Milestone(1),
                Event::Complete
            ]
        );
    }

    #[test]
    fn test_resume_while_running_is_noop() {
        let (mut timer, _events) = recording_timer(5.0, 3);
        timer.restart();
        timer.tick(1.0);
        timer.resume();

        assert!(timer.is_running());
        assert_relative_eq!(timer.time_left(), 4.0);
        assert_eq!(timer.pending_milestones(), vec![3, 2, 1]);
    }

    #[test]
    fn test_set_duration_while_running_is_ignored() {
        let (mut timer, _events) = recording_timer(4.0, 0);
        timer.restart();
        timer.set_duration(9.0).unwrap();
        assert_eq!(timer.total_duration(), 4.0);

        timer.stop(false);
        timer.restart();
        assert_relative_eq!(timer.time_left(), 4.0);
    }

    #[test]
    fn test_set_duration_while_paused_applies_on_restart() {
        let mut timer = CountdownTimer::new(4.0).unwrap();
        timer.restart();
        timer.pause();
        timer.set_duration(9.0).unwrap();

        // The current run is unaffected.
        assert_relative_eq!(timer.time_left(), 4.0);
        timer.restart();
        assert_relative_eq!(timer.time_left(), 9.0);
    }

    #[test]
    fn test_stop_snapshots_remaining() {
        let (mut timer, events) = recording_timer(10.0, 3);
        timer.restart();
        timer.tick(3.25);

        timer.stop(false);
        assert_eq!(timer.state(), TimerState::Stopped);
        assert_relative_eq!(timer.time_left(), 6.75);
        assert!(events.borrow().is_empty());

        // A second stop snapshots the already zeroed remaining time.
        timer.stop(false);
        assert_eq!(timer.time_left(), 0.0);
    }

    #[test]
    fn test_stop_with_completion_fires_listeners() {
        let (mut timer, events) = recording_timer(10.0, 3);
        timer.restart();
        timer.tick(1.0);

        timer.stop(true);
        assert_eq!(*events.borrow(), vec![Event::Complete]);

        // No further ticking after stop.
        timer.tick(100.0);
        assert_eq!(*events.borrow(), vec![Event::Complete]);
    }

    #[test]
    fn test_restart_while_running_resets_run() {
        let (mut timer, events) = recording_timer(3.0, 3);
        timer.restart();
        timer.tick(1.5);
        assert_eq!(events.borrow().len(), 2);

        timer.restart();
        assert_relative_eq!(timer.time_left(), 3.0);
        assert_eq!(timer.pending_milestones(), vec![3, 2, 1]);

        timer.tick(3.0);
        let completions = events
            .borrow()
            .iter()
            .filter(|e| **e == Event::Complete)
            .count();
        assert_eq!(completions, 1);
        assert_eq!(events.borrow().len(), 2 + 3 + 1);
    }

    #[test]
    fn test_resume_after_stop_completes_without_milestones() {
        let (mut timer, events) = recording_timer(5.0, 3);
        timer.restart();
        timer.tick(1.0);
        timer.stop(false);

        timer.resume();
        assert!(timer.pending_milestones().is_empty());
        timer.tick(0.016);

        assert_eq!(*events.borrow(), vec![Event::Complete]);
        assert_eq!(timer.state(), TimerState::Stopped);
    }

    #[test]
    fn test_resume_from_idle_completes_immediately() {
        let (mut timer, events) = recording_timer(5.0, 3);
        timer.resume();
        assert!(timer.is_running());
        assert!(timer.pending_milestones().is_empty());

        timer.tick(0.0);
        assert_eq!(*events.borrow(), vec![Event::Complete]);
        assert_eq!(timer.state(), TimerState::Stopped);
        assert_eq!(timer.time_left(), 0.0);
    }

    #[test]
    fn test_large_top_milestone() {
        let top = crate::config::MAX_TOP_MILESTONE;
        let (mut timer, events) = recording_timer(f64::from(top) + 10.0, top);
        timer.restart();

        timer.tick(10.5);
        assert_eq!(*events.borrow(), vec![Event::Milestone(top)]);

        timer.tick(2.0);
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Milestone(top),
                Event::Milestone(top - 1),
                Event::Milestone(top - 2)
            ]
        );
        assert_eq!(timer.pending_milestones().first(), Some(&(top - 3)));
    }

    #[test]
    fn test_top_milestone_above_limit_rejected() {
        let config = TimerConfig {
            top_milestone: u32::MAX,
            ..TimerConfig::default()
        };
        assert!(matches!(
            CountdownTimer::from_config(1.0, &config),
            Err(Error::ConfigValidation(_, _))
        ));
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let mut timer = CountdownTimer::new(1.0).unwrap();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = timer.on_complete(move || *counter.borrow_mut() += 1);

        assert!(timer.remove_listener(id));
        assert_eq!(timer.listener_count(), 0);
        timer.restart();
        timer.tick(1.0);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_negative_tick_is_ignored() {
        let mut timer = CountdownTimer::new(2.0).unwrap();
        timer.restart();
        timer.tick(-1.0);
        timer.tick(f64::NAN);
        assert_relative_eq!(timer.time_left(), 2.0);
    }

    #[test]
    fn test_display_updates_and_clears() {
        let config = TimerConfig {
            top_milestone: 0,
            display_mode: DisplayMode::Seconds,
            countdown_mode: true,
            ready_text: "GO!".to_string(),
        };
        let mut timer = CountdownTimer::from_config(2.0, &config).unwrap();
        let shown = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&shown);
        timer.set_display(Box::new(move |text: &str| sink.borrow_mut().push(text.to_string())));

        timer.restart();
        timer.tick(0.5);
        timer.tick(1.0);
        timer.tick(1.0);

        assert_eq!(
            *shown.borrow(),
            vec!["1".to_string(), "GO!".to_string(), "GO!".to_string(), String::new()]
        );
    }
}
