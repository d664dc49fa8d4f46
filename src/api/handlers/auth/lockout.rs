//! Progressive lockout policy.
//!
//! Pure state-transition logic, no I/O: given the current failure count
//! and lock timestamp, decide whether a login may proceed and compute the
//! next persisted state. The counter is only ever reset by a successful
//! login, never by the lock expiring.

use chrono::{DateTime, Duration, Utc};

/// Failure-tracking columns of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureState {
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl FailureState {
    /// True while a lock timestamp is set and still in the future.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    threshold: u32,
    lock_duration: Duration,
}

impl LockoutPolicy {
    #[must_use]
    pub fn new(threshold: u32, lock_minutes: i64) -> Self {
        Self {
            threshold,
            lock_duration: Duration::minutes(lock_minutes),
        }
    }

    /// Next state after a failed password check.
    ///
    /// The lock timestamp is set exactly when the new count reaches the
    /// threshold; otherwise an already-set (possibly expired) timestamp is
    /// left as is.
    #[must_use]
    pub fn on_failure(&self, state: FailureState, now: DateTime<Utc>) -> FailureState {
        let failed_attempts = state.failed_attempts.saturating_add(1);

        let locked_until = if failed_attempts >= i32::try_from(self.threshold).unwrap_or(i32::MAX)
        {
            Some(now + self.lock_duration)
        } else {
            state.locked_until
        };

        FailureState {
            failed_attempts,
            locked_until,
        }
    }

    /// State persisted after a successful login: counter and lock cleared.
    #[must_use]
    pub const fn on_success(&self) -> FailureState {
        FailureState {
            failed_attempts: 0,
            locked_until: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LockoutPolicy {
        LockoutPolicy::new(5, 30)
    }

    fn clean() -> FailureState {
        FailureState {
            failed_attempts: 0,
            locked_until: None,
        }
    }

    #[test]
    fn five_consecutive_failures_lock_for_thirty_minutes() {
        let policy = policy();
        let now = Utc::now();

        let mut state = clean();
        for _ in 0..4 {
            state = policy.on_failure(state, now);
            assert!(state.locked_until.is_none());
            assert!(!state.is_locked(now));
        }

        state = policy.on_failure(state, now);
        assert_eq!(state.failed_attempts, 5);
        assert_eq!(state.locked_until, Some(now + Duration::minutes(30)));
        assert!(state.is_locked(now));
    }

    #[test]
    fn lock_expires_but_counter_survives() {
        let policy = policy();
        let locked_at = Utc::now();

        let mut state = clean();
        for _ in 0..5 {
            state = policy.on_failure(state, locked_at);
        }

        // 31 minutes later the lock window is over, the counter is not.
        let later = locked_at + Duration::minutes(31);
        assert!(!state.is_locked(later));
        assert_eq!(state.failed_attempts, 5);

        // The next failure re-locks from the moment it crosses the threshold.
        let state = policy.on_failure(state, later);
        assert_eq!(state.failed_attempts, 6);
        assert_eq!(state.locked_until, Some(later + Duration::minutes(30)));
    }

    #[test]
    fn early_failures_leave_existing_lock_untouched() {
        let policy = LockoutPolicy::new(5, 30);
        let now = Utc::now();
        let stale_lock = Some(now - Duration::minutes(5));

        let state = FailureState {
            failed_attempts: 1,
            locked_until: stale_lock,
        };
        let next = policy.on_failure(state, now);
        assert_eq!(next.failed_attempts, 2);
        assert_eq!(next.locked_until, stale_lock);
    }

    #[test]
    fn success_resets_counter_and_clears_lock() {
        let policy = policy();
        let now = Utc::now();

        let mut state = clean();
        for _ in 0..5 {
            state = policy.on_failure(state, now);
        }
        assert!(state.is_locked(now));

        let state = policy.on_success();
        assert_eq!(state.failed_attempts, 0);
        assert!(state.locked_until.is_none());
        assert!(!state.is_locked(now));
    }

    #[test]
    fn is_locked_boundary() {
        let now = Utc::now();
        let state = FailureState {
            failed_attempts: 5,
            locked_until: Some(now),
        };
        // `now < locked_until` is strict: the exact expiry instant is unlocked.
        assert!(!state.is_locked(now));
        assert!(state.is_locked(now - Duration::seconds(1)));
    }
}
