use std::time::{Duration, Instant};

use crate::renderer::viewport::ViewportScroller;
use crate::types::playback_state::{PlaybackState, Transition};
use crate::types::story::{StoryRecord, StorySequence};

/// Default period between progress ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(100);

/// What the chrome needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct ChromeFrame<'a> {
    pub active_index: usize,
    pub active_record: &'a StoryRecord,
    pub progress: &'a [u8],
    pub enable_dark_backdrop: bool,
}

/// The one outstanding periodic tick.
#[derive(Debug, Clone, Copy)]
struct TickSchedule {
    period: Duration,
    next_due: Instant,
}

impl TickSchedule {
    fn starting_at(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    /// Number of whole periods that have elapsed by `now`; moves the deadline
    /// past them.
    fn take_due(&mut self, now: Instant) -> u64 {
        if now < self.next_due {
            return 0;
        }
        let period = self.period.as_nanos().max(1);
        let due = now.duration_since(self.next_due).as_nanos() / period + 1;
        // a deadline past what Instant can hold restarts the phase from now
        self.next_due = u64::try_from(due * period)
            .ok()
            .and_then(|step| self.next_due.checked_add(Duration::from_nanos(step)))
            .unwrap_or_else(|| now.checked_add(self.period).unwrap_or(now));
        u64::try_from(due).unwrap_or(u64::MAX)
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

/// Drives the story carousel: owns the playback state, schedules ticks and
/// forwards scroll commands to the viewport.
pub struct StoryPlayer<S: ViewportScroller> {
    state: PlaybackState,
    scroller: S,
    tick_period: Duration,
    schedule: Option<TickSchedule>,
}

impl<S: ViewportScroller> StoryPlayer<S> {
    pub fn new(scroller: S, tick_period: Duration) -> Self {
        Self {
            state: PlaybackState::default(),
            scroller,
            tick_period,
            schedule: None,
        }
    }

    /// Starts a session over `sequence`. An empty sequence leaves the player idle.
    pub fn mount(&mut self, sequence: StorySequence, now: Instant) {
        let len = sequence.len();
        self.state = PlaybackState::new(sequence);
        self.schedule = if len > 0 {
            Some(TickSchedule::starting_at(now, self.tick_period))
        } else {
            None
        };
        tracing::info!(stories = len, "story player mounted");
    }

    /// Stops the timer and drops the session's state.
    pub fn unmount(&mut self) {
        if self.schedule.take().is_some() {
            tracing::info!("story player unmounted");
        }
        self.state = PlaybackState::default();
    }

    /// Installs new content. Re-supplying the same sequence keeps the
    /// current position; a different sequence restarts from the first story.
    pub fn replace_sequence(&mut self, sequence: StorySequence, now: Instant) {
        if self.is_mounted() && self.state.sequence().id() == sequence.id() {
            return;
        }
        self.mount(sequence, now);
        if !self.state.is_idle() {
            self.scroller.scroll_to_index(0);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn scroller(&self) -> &S {
        &self.scroller
    }

    pub fn scroller_mut(&mut self) -> &mut S {
        &mut self.scroller
    }

    /// Runs every tick that fell due by `now`.
    pub fn poll(&mut self, now: Instant) -> u64 {
        let Some(schedule) = self.schedule.as_mut() else {
            return 0;
        };
        let due = schedule.take_due(now);
        for _ in 0..due {
            let transition = self.state.tick();
            self.dispatch(transition);
        }
        due
    }

    /// The "skip" gesture. The tick phase restarts from `now` so the new
    /// story gets a full first period.
    pub fn advance(&mut self, now: Instant) -> Transition {
        if !self.is_mounted() {
            return Transition::Idle;
        }
        let transition = self.state.skip();
        self.dispatch(transition);
        self.schedule = Some(TickSchedule::starting_at(now, self.tick_period));
        transition
    }

    /// How long the UI may sleep before the next tick is due.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.schedule.as_ref().map(|s| s.remaining(now))
    }

    pub fn chrome(&self) -> Option<ChromeFrame<'_>> {
        let active_record = self.state.active_record()?;
        Some(ChromeFrame {
            active_index: self.state.active_index(),
            active_record,
            progress: self.state.progress(),
            enable_dark_backdrop: active_record.enable_dark_backdrop,
        })
    }

    fn dispatch(&mut self, transition: Transition) {
        if let Transition::Advanced {
            next_index,
            wrapped,
        } = transition
        {
            tracing::debug!(next_index, wrapped, "advancing story");
            self.scroller.scroll_to_index(next_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::viewport::testing::RecordingScroller;

    const PERIOD: Duration = Duration::from_millis(100);

    fn sequence(n: usize) -> StorySequence {
        StorySequence::new(
            (0..n)
                .map(|i| StoryRecord {
                    title: format!("Story {i}"),
                    enable_dark_backdrop: i % 2 == 1,
                    ..StoryRecord::default()
                })
                .collect(),
        )
    }

    fn mounted(n: usize) -> (StoryPlayer<RecordingScroller>, Instant) {
        let mut player = StoryPlayer::new(RecordingScroller::default(), PERIOD);
        let t0 = Instant::now();
        player.mount(sequence(n), t0);
        (player, t0)
    }

    fn at(t0: Instant, ticks: u32) -> Instant {
        t0 + PERIOD * ticks
    }

    #[test]
    fn test_empty_sequence_stays_idle() {
        let (mut player, t0) = mounted(0);
        assert!(!player.is_mounted());
        assert!(player.chrome().is_none());
        assert_eq!(player.poll(at(t0, 500)), 0);
        assert_eq!(player.advance(at(t0, 500)), Transition::Idle);
        assert!(player.scroller().commands.is_empty());
        assert_eq!(player.time_until_next_tick(t0), None);
    }

    #[test]
    fn test_no_tick_before_first_period() {
        let (mut player, t0) = mounted(2);
        assert_eq!(player.poll(t0 + Duration::from_millis(99)), 0);
        assert_eq!(player.state().progress(), &[0, 0]);
        assert_eq!(
            player.time_until_next_tick(t0 + Duration::from_millis(40)),
            Some(Duration::from_millis(60))
        );
    }

    #[test]
    fn test_poll_catches_up_elapsed_ticks() {
        let (mut player, t0) = mounted(3);
        assert_eq!(player.poll(at(t0, 250)), 250);
        assert_eq!(player.state().active_index(), 2);
        assert_eq!(player.state().progress(), &[100, 100, 50]);
        assert_eq!(player.scroller().commands, vec![1, 2]);
    }

    #[test]
    fn test_incremental_polls_match_one_poll() {
        let (mut stepped, t0) = mounted(3);
        for t in 1..=431 {
            stepped.poll(at(t0, t) + Duration::from_millis(3));
        }
        let mut single = StoryPlayer::new(RecordingScroller::default(), PERIOD);
        single.mount(sequence(3), t0);
        single.poll(at(t0, 431) + Duration::from_millis(3));
        assert_eq!(stepped.state().active_index(), single.state().active_index());
        assert_eq!(stepped.state().progress(), single.state().progress());
        assert_eq!(stepped.scroller().commands, single.scroller().commands);
    }

    #[test]
    fn test_full_cycle_scrolls_back_to_start() {
        let (mut player, t0) = mounted(3);
        player.poll(at(t0, 300));
        assert_eq!(player.state().active_index(), 0);
        assert_eq!(player.state().progress(), &[0, 0, 0]);
        assert_eq!(player.scroller().commands, vec![1, 2, 0]);
    }

    #[test]
    fn test_advance_on_last_story_issues_one_scroll() {
        let (mut player, t0) = mounted(3);
        player.poll(at(t0, 215));
        player.scroller_mut().commands.clear();
        let transition = player.advance(at(t0, 215));
        assert_eq!(
            transition,
            Transition::Advanced {
                next_index: 0,
                wrapped: true
            }
        );
        assert_eq!(player.state().active_index(), 0);
        assert_eq!(player.state().progress(), &[0, 0, 0]);
        assert_eq!(player.scroller().commands, vec![0]);
    }

    #[test]
    fn test_advance_restarts_tick_phase() {
        let (mut player, t0) = mounted(2);
        player.poll(t0 + Duration::from_millis(150));
        player.advance(t0 + Duration::from_millis(150));
        assert_eq!(player.poll(t0 + Duration::from_millis(240)), 0);
        assert_eq!(player.poll(t0 + Duration::from_millis(250)), 1);
        assert_eq!(player.state().progress(), &[100, 1]);
    }

    #[test]
    fn test_unmount_cancels_ticks() {
        let (mut player, t0) = mounted(2);
        player.poll(at(t0, 10));
        player.unmount();
        assert!(!player.is_mounted());
        assert_eq!(player.poll(at(t0, 1000)), 0);
        assert!(player.state().is_idle());
        assert!(player.chrome().is_none());
    }

    #[test]
    fn test_replace_sequence_resets_position() {
        let (mut player, t0) = mounted(3);
        player.poll(at(t0, 150));
        assert_eq!(player.state().active_index(), 1);

        let now = at(t0, 150);
        player.replace_sequence(sequence(4), now);
        assert_eq!(player.state().len(), 4);
        assert_eq!(player.state().active_index(), 0);
        assert_eq!(player.state().progress(), &[0, 0, 0, 0]);
        assert_eq!(player.scroller().commands.last(), Some(&0));
        assert_eq!(player.poll(now + PERIOD), 1);
    }

    #[test]
    fn test_replace_with_empty_sequence_goes_idle() {
        let (mut player, t0) = mounted(3);
        player.poll(at(t0, 150));
        player.scroller_mut().commands.clear();

        let now = at(t0, 150);
        player.replace_sequence(StorySequence::empty(), now);
        assert!(!player.is_mounted());
        assert!(player.state().is_idle());
        assert_eq!(player.time_until_next_tick(now), None);
        assert!(player.scroller().commands.is_empty());
        assert!(player.chrome().is_none());
        assert_eq!(player.poll(at(t0, 1000)), 0);
        assert_eq!(player.advance(at(t0, 1000)), Transition::Idle);
        assert!(player.scroller().commands.is_empty());
    }

    #[test]
    fn test_take_due_counts_beyond_u32_periods() {
        let t0 = Instant::now();
        let period = Duration::from_nanos(1);
        let mut schedule = TickSchedule::starting_at(t0, period);
        let now = t0 + Duration::from_secs(5);
        assert_eq!(schedule.take_due(now), 5_000_000_000);
        assert_eq!(schedule.next_due, now + period);
        assert_eq!(schedule.take_due(now), 0);
    }

    #[test]
    fn test_take_due_with_zero_period() {
        let t0 = Instant::now();
        let mut schedule = TickSchedule::starting_at(t0, Duration::ZERO);
        assert_eq!(schedule.take_due(t0 + Duration::from_nanos(10)), 11);
        assert!(schedule.next_due > t0 + Duration::from_nanos(10));
    }

    #[test]
    fn test_replace_with_same_sequence_keeps_position() {
        let mut player = StoryPlayer::new(RecordingScroller::default(), PERIOD);
        let t0 = Instant::now();
        let content = sequence(2);
        player.mount(content.clone(), t0);
        player.poll(at(t0, 120));
        player.replace_sequence(content, at(t0, 120));
        assert_eq!(player.state().active_index(), 1);
        assert_eq!(player.state().progress(), &[100, 20]);
    }

    #[test]
    fn test_chrome_reflects_active_story() {
        let (mut player, t0) = mounted(2);
        player.poll(at(t0, 130));
        let chrome = player.chrome().unwrap();
        assert_eq!(chrome.active_index, 1);
        assert_eq!(chrome.active_record.title, "Story 1");
        assert_eq!(chrome.progress, &[100, 30]);
        assert!(chrome.enable_dark_backdrop);
    }
}
