//! Session-scoped one-shot flags.
//!
//! Flags live only as long as the process, which stands in for one browser
//! session, and are reset at logout.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set once the session has tried to accept a pending invite.
pub const INVITE_ACCEPT_ATTEMPTED: &str = "inviteAcceptAttempted";

#[derive(Debug, Default)]
pub struct SessionFlags {
    set: Mutex<HashSet<String>>,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically set `flag`, returning `true` only for the caller that set
    /// it. Callers must claim before starting the guarded work.
    pub fn try_claim(&self, flag: &str) -> bool {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(flag.to_string())
    }

    pub fn is_set(&self, flag: &str) -> bool {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(flag)
    }

    /// Clear every flag (logout).
    pub fn reset(&self) {
        self.set.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_claim_wins() {
        let flags = SessionFlags::new();
        assert!(!flags.is_set(INVITE_ACCEPT_ATTEMPTED));
        assert!(flags.try_claim(INVITE_ACCEPT_ATTEMPTED));
        assert!(!flags.try_claim(INVITE_ACCEPT_ATTEMPTED));
        assert!(flags.is_set(INVITE_ACCEPT_ATTEMPTED));
    }

    #[test]
    fn reset_rearms_flags() {
        let flags = SessionFlags::new();
        flags.try_claim(INVITE_ACCEPT_ATTEMPTED);
        flags.reset();
        assert!(flags.try_claim(INVITE_ACCEPT_ATTEMPTED));
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        let flags = Arc::new(SessionFlags::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let flags = Arc::clone(&flags);
                std::thread::spawn(move || flags.try_claim("once"))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
