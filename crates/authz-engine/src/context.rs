//! Per-request record of whether authorization was performed.

use crate::error::{AuthzError, Result};

/// Tracks whether a request went through authorization.
///
/// Create one per request and thread it through the handlers; call
/// [`verify_authorized`](Self::verify_authorized) at the end to catch
/// code paths that forgot to authorize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationContext {
    performed: bool,
}

impl AuthorizationContext {
    /// Creates a context in which nothing has been authorized yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that authorization was performed. Called by
    /// [`DecisionEngine::authorize`](crate::engine::DecisionEngine::authorize)
    /// whatever the outcome.
    pub fn mark_performed(&mut self) {
        self.performed = true;
    }

    /// Marks the request as intentionally not needing authorization.
    pub fn skip_authorization(&mut self) {
        self.performed = true;
    }

    pub fn is_performed(&self) -> bool {
        self.performed
    }

    /// Fails with [`AuthzError::AuthorizationNotPerformed`] unless
    /// authorization was performed or skipped.
    pub fn verify_authorized(&self) -> Result<()> {
        if self.performed {
            Ok(())
        } else {
            Err(AuthzError::AuthorizationNotPerformed)
        }
    }

    /// Clears the flag so the context can be reused for another request.
    pub fn reset(&mut self) {
        self.performed = false;
    }
}
