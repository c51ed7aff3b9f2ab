//! Handshake between a caller that may stop waiting and blocking work that
//! persists state.
//!
//! The worker calls [`CancelToken::commit`] before its first durable write and
//! the caller calls [`CancelToken::cancel`] when its deadline passes. Exactly
//! one of the two transitions wins:
//! - cancel first: every later commit fails, so the worker writes nothing
//! - commit first: cancel fails, and the caller must wait for the result

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenState {
    Open = 0,
    Committed = 1,
    Cancelled = 2,
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<AtomicU8>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(TokenState::Open as u8)),
        }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to persist. Returns false once the token is cancelled.
    /// Committing again after a successful commit is allowed.
    pub fn commit(&self) -> bool {
        self.transition(TokenState::Committed)
    }

    /// Give up on the work. Returns false when it has already committed.
    pub fn cancel(&self) -> bool {
        self.transition(TokenState::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == TokenState::Cancelled as u8
    }

    fn transition(&self, to: TokenState) -> bool {
        match self.state.compare_exchange(
            TokenState::Open as u8,
            to as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(current) => current == to as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_then_cancel_fails() {
        let token = CancelToken::new();
        assert!(token.commit());
        assert!(token.commit());
        assert!(!token.cancel());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_then_commit_fails() {
        let token = CancelToken::new();
        assert!(token.cancel());
        assert!(token.is_cancelled());
        assert!(!token.commit());
        assert!(token.cancel());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(token.cancel());
        assert!(!worker.commit());
    }

    #[test]
    fn test_exactly_one_side_wins_under_contention() {
        for _ in 0..200 {
            let token = CancelToken::new();
            let worker = token.clone();
            let committer = std::thread::spawn(move || worker.commit());
            let cancelled = token.cancel();
            let committed = committer.join().unwrap();
            assert!(cancelled != committed);
        }
    }
}
