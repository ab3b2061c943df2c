// ── Session port ──
//
// The identity provider's sign-in flow lives outside this crate. The core
// only asks whether a session is present and tells it to end when the
// backend rejects the token.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

/// Pass/fail view of the operator's session.
pub trait SessionPort: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// End the session. Called when the backend answers 401/403.
    fn logout(&self);
}

/// Session backed by an access token obtained elsewhere.
///
/// Authenticated while a token was supplied and `logout` has not been
/// called.
#[derive(Debug)]
pub struct TokenSession {
    active: AtomicBool,
}

impl TokenSession {
    pub fn new(has_token: bool) -> Self {
        Self {
            active: AtomicBool::new(has_token),
        }
    }
}

impl SessionPort for TokenSession {
    fn is_authenticated(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn logout(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            info!("session ended; sign in again to continue");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logout_is_sticky() {
        let session = TokenSession::new(true);
        assert!(session.is_authenticated());
        session.logout();
        session.logout();
        assert!(!session.is_authenticated());
    }
}
