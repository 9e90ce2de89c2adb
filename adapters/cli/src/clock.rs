//! Converts real frame time into whole simulation ticks.

use std::time::Duration;

/// Upper bound on ticks released in a single frame; older backlog is dropped.
pub(crate) const MAX_TICKS_PER_FRAME: u32 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TickClock {
    accumulator: Duration,
}

impl TickClock {
    /// Accumulates `elapsed` and returns the number of whole ticks due.
    ///
    /// A missing or zero `interval` means ticks are not being consumed, so the
    /// accumulator is cleared and resuming starts from a fresh interval.
    pub(crate) fn advance(&mut self, elapsed: Duration, interval: Option<Duration>) -> u32 {
        let Some(interval) = interval.filter(|interval| !interval.is_zero()) else {
            self.accumulator = Duration::ZERO;
            return 0;
        };

        self.accumulator += elapsed;
        let due = self.accumulator.as_nanos() / interval.as_nanos();
        let remainder = self.accumulator.as_nanos() % interval.as_nanos();
        let due = u32::try_from(due).unwrap_or(u32::MAX);

        if due > MAX_TICKS_PER_FRAME {
            self.accumulator = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
            return MAX_TICKS_PER_FRAME;
        }

        self.accumulator -= interval * due;
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[test]
    fn partial_intervals_accumulate() {
        let mut clock = TickClock::default();

        assert_eq!(clock.advance(Duration::from_millis(60), Some(INTERVAL)), 0);
        assert_eq!(clock.advance(Duration::from_millis(60), Some(INTERVAL)), 1);
        assert_eq!(clock.advance(Duration::from_millis(80), Some(INTERVAL)), 1);
        assert_eq!(clock.accumulator, Duration::ZERO);
    }

    #[test]
    fn backlog_is_capped_and_dropped() {
        let mut clock = TickClock::default();

        assert_eq!(
            clock.advance(Duration::from_millis(1_250), Some(INTERVAL)),
            MAX_TICKS_PER_FRAME
        );
        assert_eq!(clock.accumulator, Duration::from_millis(50));
        assert_eq!(clock.advance(Duration::from_millis(10), Some(INTERVAL)), 0);
    }

    #[test]
    fn missing_interval_resets_accumulator() {
        let mut clock = TickClock::default();
        assert_eq!(clock.advance(Duration::from_millis(90), Some(INTERVAL)), 0);

        assert_eq!(clock.advance(Duration::from_secs(5), None), 0);
        assert_eq!(clock.advance(Duration::from_millis(20), Some(INTERVAL)), 0);
        assert_eq!(clock.accumulator, Duration::from_millis(20));
    }

    #[test]
    fn zero_interval_never_ticks() {
        let mut clock = TickClock::default();

        assert_eq!(clock.advance(Duration::from_secs(1), Some(Duration::ZERO)), 0);
    }
}
