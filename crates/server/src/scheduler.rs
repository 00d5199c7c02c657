//! Cooldown-based action scheduler.
//!
//! A single-slot gate per player per action kind. The first invocation
//! of a kind always fires and arms the clock; a repeat fires only once
//! the action's cost (in time units, divided by the server frequency)
//! has elapsed since the last arm. A rejected action is dropped, never
//! queued or retried.

use protocol::commands::ActionKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Real-world wait for one action at the given frequency.
pub fn required_wait(kind: ActionKind, frequency: u32) -> Duration {
    Duration::from_secs_f64(kind.cost() as f64 / frequency as f64)
}

/// Consult and update the gate for one invocation at time `now`.
/// Returns true when the action may execute; on refusal the gate is
/// left untouched so no partial credit accrues.
pub fn try_fire(
    cooldowns: &mut HashMap<ActionKind, Instant>,
    kind: ActionKind,
    frequency: u32,
    now: Instant,
) -> bool {
    match cooldowns.get(&kind) {
        None => {
            cooldowns.insert(kind, now);
            true
        }
        Some(&armed) if now.duration_since(armed) >= required_wait(kind, frequency) => {
            cooldowns.insert(kind, now);
            true
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_invocation_always_fires() {
        let mut cooldowns = HashMap::new();
        let now = Instant::now();
        for kind in [
            ActionKind::Forward,
            ActionKind::Incantation,
            ActionKind::Inventory,
        ] {
            assert!(try_fire(&mut cooldowns, kind, 100, now));
        }
    }

    #[test]
    fn test_immediate_repeat_is_refused() {
        let mut cooldowns = HashMap::new();
        let now = Instant::now();
        assert!(try_fire(&mut cooldowns, ActionKind::Forward, 100, now));
        assert!(!try_fire(&mut cooldowns, ActionKind::Forward, 100, now));
    }

    #[test]
    fn test_repeat_after_wait_fires() {
        let mut cooldowns = HashMap::new();
        let now = Instant::now();
        assert!(try_fire(&mut cooldowns, ActionKind::Forward, 100, now));

        // 7 time units at frequency 100 is 70ms.
        let not_yet = now + Duration::from_millis(69);
        assert!(!try_fire(&mut cooldowns, ActionKind::Forward, 100, not_yet));

        let elapsed = now + Duration::from_millis(70);
        assert!(try_fire(&mut cooldowns, ActionKind::Forward, 100, elapsed));

        // The gate re-armed at `elapsed`, not at the refused attempt.
        assert!(!try_fire(
            &mut cooldowns,
            ActionKind::Forward,
            100,
            elapsed + Duration::from_millis(69)
        ));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut cooldowns = HashMap::new();
        let now = Instant::now();
        assert!(try_fire(&mut cooldowns, ActionKind::Forward, 100, now));
        assert!(try_fire(&mut cooldowns, ActionKind::Right, 100, now));
        assert!(!try_fire(&mut cooldowns, ActionKind::Forward, 100, now));
    }

    #[test]
    fn test_zero_cost_never_waits() {
        let mut cooldowns = HashMap::new();
        let now = Instant::now();
        assert!(try_fire(&mut cooldowns, ActionKind::ConnectNbr, 100, now));
        assert!(try_fire(&mut cooldowns, ActionKind::ConnectNbr, 100, now));
    }

    #[test]
    fn test_required_wait_scales_with_frequency() {
        assert_eq!(
            required_wait(ActionKind::Forward, 100),
            Duration::from_millis(70)
        );
        assert_eq!(
            required_wait(ActionKind::Forward, 7),
            Duration::from_secs(1)
        );
        assert_eq!(
            required_wait(ActionKind::Incantation, 100),
            Duration::from_secs(3)
        );
    }
}
