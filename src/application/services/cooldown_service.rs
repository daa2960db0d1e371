//! Global and per-user promotion rate limiting.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::entities::{CooldownSettings, RejectReason, UserId};

/// Forward-only cooldown deadlines, shared across concurrent pipeline runs.
#[derive(Debug, Default)]
struct RateLimitState {
    next_global: Option<Instant>,
    next_user: HashMap<UserId, Instant>,
}

/// Gates pipeline continuation on cooldowns and records successful
/// promotions.
///
/// State lives behind a single mutex; deadlines only move forward and only
/// as a side effect of a fully successful promotion.
pub struct RateLimiter {
    global: Duration,
    user: Duration,
    state: Mutex<RateLimitState>,
}

impl RateLimiter {
    /// Creates a limiter with no cooldown active.
    #[must_use]
    pub fn new(cooldowns: CooldownSettings) -> Self {
        Self {
            global: Duration::from_secs(cooldowns.global),
            user: Duration::from_secs(cooldowns.user),
            state: Mutex::new(RateLimitState::default()),
        }
    }

    /// Checks the global gate, then the per-user gate. The first failing
    /// check wins; an absent per-user entry means never limited.
    ///
    /// # Errors
    /// Returns the cooldown rejection with the remaining whole seconds.
    pub fn check(&self, sender: &UserId) -> Result<(), RejectReason> {
        self.check_at(sender, Instant::now())
    }

    /// [`Self::check`] against an explicit point in time.
    ///
    /// # Errors
    /// Returns the cooldown rejection with the remaining whole seconds.
    pub fn check_at(&self, sender: &UserId, now: Instant) -> Result<(), RejectReason> {
        let state = self.state.lock();

        if let Some(deadline) = state.next_global {
            if now < deadline {
                let remaining = deadline - now;
                debug!(remaining_secs = remaining.as_secs(), "global cooldown active");
                return Err(RejectReason::GlobalCooldown {
                    remaining_secs: remaining.as_secs(),
                });
            }
        }

        if let Some(&deadline) = state.next_user.get(sender) {
            if now < deadline {
                let remaining = deadline - now;
                debug!(
                    sender = %sender,
                    remaining_secs = remaining.as_secs(),
                    "user cooldown active"
                );
                return Err(RejectReason::UserCooldown {
                    remaining_secs: remaining.as_secs(),
                });
            }
        }

        Ok(())
    }

    /// Advances both deadlines after a fully successful promotion.
    pub fn commit(&self, sender: &UserId) {
        self.commit_at(sender, Instant::now());
    }

    /// [`Self::commit`] against an explicit point in time.
    pub fn commit_at(&self, sender: &UserId, now: Instant) {
        let mut state = self.state.lock();
        state.next_global = Some(now + self.global);
        state.next_user.insert(sender.clone(), now + self.user);
        debug!(
            sender = %sender,
            global_secs = self.global.as_secs(),
            user_secs = self.user.as_secs(),
            "cooldowns updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(global: u64, user: u64) -> RateLimiter {
        RateLimiter::new(CooldownSettings { global, user })
    }

    #[test]
    fn fresh_limiter_gates_nobody() {
        let rl = limiter(30, 300);
        assert!(rl.check(&UserId::from("@a:hs")).is_ok());
    }

    #[test]
    fn global_gate_applies_to_everyone_until_expiry() {
        let rl = limiter(30, 300);
        let t0 = Instant::now();
        rl.commit_at(&UserId::from("@a:hs"), t0);

        let within = t0 + Duration::from_secs(10);
        assert!(matches!(
            rl.check_at(&UserId::from("@b:hs"), within),
            Err(RejectReason::GlobalCooldown { remaining_secs: 20 })
        ));

        let after = t0 + Duration::from_secs(30);
        assert!(rl.check_at(&UserId::from("@b:hs"), after).is_ok());
    }

    #[test]
    fn user_gate_is_independent_per_user() {
        let rl = limiter(30, 300);
        let t0 = Instant::now();
        rl.commit_at(&UserId::from("@a:hs"), t0);

        // Global gate has expired; only @a is still limited.
        let later = t0 + Duration::from_secs(60);
        assert!(matches!(
            rl.check_at(&UserId::from("@a:hs"), later),
            Err(RejectReason::UserCooldown { remaining_secs: 240 })
        ));
        assert!(rl.check_at(&UserId::from("@b:hs"), later).is_ok());
    }

    #[test]
    fn global_gate_is_checked_first() {
        let rl = limiter(300, 300);
        let t0 = Instant::now();
        rl.commit_at(&UserId::from("@a:hs"), t0);

        // Both gates are active for @a; the global one wins.
        let within = t0 + Duration::from_secs(10);
        assert!(matches!(
            rl.check_at(&UserId::from("@a:hs"), within),
            Err(RejectReason::GlobalCooldown { .. })
        ));
    }

    #[test]
    fn checks_do_not_mutate_state() {
        let rl = limiter(30, 300);
        let t0 = Instant::now();
        rl.commit_at(&UserId::from("@a:hs"), t0);

        let within = t0 + Duration::from_secs(5);
        for _ in 0..3 {
            let err = rl.check_at(&UserId::from("@a:hs"), within).unwrap_err();
            assert_eq!(err, RejectReason::GlobalCooldown { remaining_secs: 25 });
        }
    }

    #[test]
    fn zero_durations_are_noop_cooldowns() {
        let rl = limiter(0, 0);
        let t0 = Instant::now();
        rl.commit_at(&UserId::from("@a:hs"), t0);
        assert!(rl.check_at(&UserId::from("@a:hs"), t0).is_ok());
    }

    #[test]
    fn commits_only_move_deadlines_forward() {
        let rl = limiter(30, 300);
        let t0 = Instant::now();
        rl.commit_at(&UserId::from("@a:hs"), t0);
        rl.commit_at(&UserId::from("@a:hs"), t0 + Duration::from_secs(40));

        let probe = t0 + Duration::from_secs(50);
        assert!(matches!(
            rl.check_at(&UserId::from("@a:hs"), probe),
            Err(RejectReason::GlobalCooldown { remaining_secs: 20 })
        ));
    }
}
