use std::time::Duration;

use foundation::years::{YearDomain, YearRange};

/// Default interval between playback ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(300);

/// Proof that a tick was issued by a particular playback run.
///
/// Every `start` mints a fresh generation; `stop` retires it. Ticks carrying a
/// retired generation are stale and must not touch any state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TickToken {
    generation: u64,
}

impl TickToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing {
        generation: u64,
    },
}

/// Stopped/Playing state machine for time-lapse playback.
///
/// Owns no timer itself; the caller arms one per token returned by
/// [`PlaybackScheduler::start`] and routes ticks back through
/// [`PlaybackScheduler::accept`].
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    state: PlaybackState,
    generation: u64,
    period: Duration,
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl PlaybackScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            state: PlaybackState::Stopped,
            generation: 0,
            period,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stopped -> Playing. Returns the token for the new run, or `None` when
    /// already playing.
    pub fn start(&mut self) -> Option<TickToken> {
        if self.is_playing() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = PlaybackState::Playing {
            generation: self.generation,
        };
        Some(TickToken {
            generation: self.generation,
        })
    }

    /// Playing -> Stopped. Idempotent; returns whether a run was stopped.
    pub fn stop(&mut self) -> bool {
        let was_playing = self.is_playing();
        self.state = PlaybackState::Stopped;
        was_playing
    }

    /// Whether a tick carrying `token` may take effect now.
    pub fn accept(&self, token: &TickToken) -> bool {
        match self.state {
            PlaybackState::Playing { generation } => generation == token.generation,
            PlaybackState::Stopped => false,
        }
    }
}

/// The window after one playback step: shifted one year forward, width kept.
///
/// Past the end of the domain the window wraps to the start; if it is wider
/// than the domain allows it is pinned to the end instead.
pub fn next_window(range: YearRange, domain: YearDomain) -> YearRange {
    let width = range.width();
    let end = range.end() + 1;
    if end <= domain.max {
        return YearRange::new(range.start() + 1, end);
    }
    let wrapped_end = domain.min + width;
    if wrapped_end <= domain.max {
        return YearRange::new(domain.min, wrapped_end);
    }
    YearRange::new(domain.clamp(domain.max - width), domain.max)
}

#[cfg(test)]
mod tests {
    use super::{next_window, PlaybackScheduler, PlaybackState, DEFAULT_TICK_PERIOD};
    use foundation::years::{YearDomain, YearRange};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn starts_stopped_with_default_period() {
        let s = PlaybackScheduler::default();
        assert_eq!(s.state(), PlaybackState::Stopped);
        assert_eq!(s.period(), DEFAULT_TICK_PERIOD);
        let fast = PlaybackScheduler::new(Duration::from_millis(50));
        assert_eq!(fast.period().as_millis(), 50);
    }

    #[test]
    fn double_start_and_double_stop_are_noops() {
        let mut s = PlaybackScheduler::default();
        let token = s.start().unwrap();
        assert_eq!(s.start(), None);
        assert!(s.accept(&token));
        assert!(s.stop());
        assert!(!s.stop());
        assert_eq!(s.state(), PlaybackState::Stopped);
    }

    #[test]
    fn stale_tokens_are_rejected() {
        let mut s = PlaybackScheduler::default();
        let first = s.start().unwrap();
        s.stop();
        assert!(!s.accept(&first));

        let second = s.start().unwrap();
        assert_ne!(first, second);
        assert!(!s.accept(&first));
        assert!(s.accept(&second));
    }

    #[test]
    fn steps_forward_keeping_width() {
        let d = YearDomain::default();
        assert_eq!(
            next_window(YearRange::new(2000, 2002), d),
            YearRange::new(2001, 2003)
        );
        assert_eq!(
            next_window(YearRange::single(2024), d),
            YearRange::single(2025)
        );
    }

    #[test]
    fn wraps_at_the_end_of_the_domain() {
        let d = YearDomain::default();
        assert_eq!(
            next_window(YearRange::new(2024, 2025), d),
            YearRange::new(1950, 1951)
        );
        assert_eq!(
            next_window(YearRange::single(2025), d),
            YearRange::single(1950)
        );
    }

    #[test]
    fn full_width_window_stays_pinned() {
        let d = YearDomain::new(2000, 2004);
        assert_eq!(next_window(d.full_range(), d), d.full_range());
        // Wider than the domain: clamped, never outside it.
        assert_eq!(next_window(YearRange::new(1990, 2004), d), d.full_range());
    }
}
