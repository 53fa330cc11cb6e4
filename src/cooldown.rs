use std::time::{Duration, Instant};

/// Default pause after a stressed reading.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Debounce state armed by a stressed verdict.
///
/// `Idle -> Paused` on [`Cooldown::arm`], `Paused -> Idle` once
/// [`Cooldown::poll`] observes the deadline has passed. There is no other
/// way out of the paused state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cooldown {
    #[default]
    Idle,
    Paused { until: Instant },
}

/// Result of polling a [`Cooldown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Idle,
    Paused { remaining: Duration },
}

impl Cooldown {
    /// Pause until `now + duration`. Does nothing while already paused.
    ///
    /// Fails, leaving the state idle, when the deadline is not representable.
    pub fn arm(&mut self, now: Instant, duration: Duration) -> anyhow::Result<()> {
        if self.is_paused() {
            return Ok(());
        }
        let until = now
            .checked_add(duration)
            .ok_or_else(|| anyhow::anyhow!("cooldown of {duration:?} overflows the clock"))?;
        *self = Cooldown::Paused { until };
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Cooldown::Paused { .. })
    }

    pub fn poll(&mut self, now: Instant) -> CooldownStatus {
        match *self {
            Cooldown::Idle => CooldownStatus::Idle,
            Cooldown::Paused { until } if now < until => CooldownStatus::Paused {
                remaining: until - now,
            },
            Cooldown::Paused { .. } => {
                *self = Cooldown::Idle;
                CooldownStatus::Idle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_by_default() {
        let mut c = Cooldown::default();
        assert_eq!(c.poll(Instant::now()), CooldownStatus::Idle);
    }

    #[test]
    fn clears_exactly_at_deadline() {
        let start = Instant::now();
        let mut c = Cooldown::default();
        c.arm(start, DEFAULT_COOLDOWN).unwrap();

        let just_before = start + DEFAULT_COOLDOWN - Duration::from_millis(1);
        assert_eq!(
            c.poll(just_before),
            CooldownStatus::Paused {
                remaining: Duration::from_millis(1)
            }
        );
        assert!(c.is_paused());

        assert_eq!(c.poll(start + DEFAULT_COOLDOWN), CooldownStatus::Idle);
        assert!(!c.is_paused());
    }

    #[test]
    fn reports_remaining_time() {
        let start = Instant::now();
        let mut c = Cooldown::default();
        c.arm(start, Duration::from_secs(30)).unwrap();
        assert_eq!(
            c.poll(start + Duration::from_secs(12)),
            CooldownStatus::Paused {
                remaining: Duration::from_secs(18)
            }
        );
    }

    #[test]
    fn arming_while_paused_keeps_deadline() {
        let start = Instant::now();
        let mut c = Cooldown::default();
        c.arm(start, Duration::from_secs(30)).unwrap();
        c.arm(start + Duration::from_secs(10), Duration::from_secs(30)).unwrap();
        assert_eq!(
            c,
            Cooldown::Paused {
                until: start + Duration::from_secs(30)
            }
        );
        assert_eq!(c.poll(start + Duration::from_secs(30)), CooldownStatus::Idle);
    }

    #[test]
    fn unrepresentable_deadline_is_an_error() {
        let mut c = Cooldown::default();
        assert!(c.arm(Instant::now(), Duration::MAX).is_err());
        assert_eq!(c, Cooldown::Idle);
    }
}
