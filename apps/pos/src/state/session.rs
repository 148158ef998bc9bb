//! # Session State
//!
//! The signed-in user, shared by every command and observable by any view.
//!
//! ## Read / Write / Subscribe
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login / restore ──► set(Session) ──┐                                   │
//! │  update_user(patch) ────────────────┼──► watch::Sender<Option<Session>> │
//! │  logout / expiry ──► clear() ───────┘             │                     │
//! │                                                   ▼                     │
//! │                        current() / user() / capabilities()              │
//! │                        subscribe() ──► watch::Receiver (views)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisting the token is the caller's job (see `commands::auth`).

use idcashier_client::Session;
use idcashier_core::permissions::Capability;
use idcashier_core::{resolve_permissions, CapabilitySet, User, UserPatch};
use tokio::sync::watch;
use tracing::info;

use crate::error::{ApiError, ApiResult};

#[derive(Debug)]
pub struct SessionState {
    tx: watch::Sender<Option<Session>>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        SessionState { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.tx.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// The session, or `AUTH_REQUIRED`.
    pub fn require(&self) -> ApiResult<Session> {
        self.current().ok_or_else(ApiError::auth_required)
    }

    pub fn set(&self, session: Session) {
        info!(user_id = %session.user.id, role = session.user.role.as_str(), "Session started");
        self.tx.send_replace(Some(session));
    }

    pub fn clear(&self) {
        if self.tx.send_replace(None).is_some() {
            info!("Session cleared");
        }
    }

    /// Merges a patch into the signed-in user. Returns false when nobody is
    /// signed in or nothing changed.
    pub fn update_user(&self, patch: UserPatch) -> bool {
        self.tx.send_if_modified(|slot| match slot {
            Some(session) => {
                let before = session.user.clone();
                session.user.apply(patch);
                session.user != before
            }
            None => false,
        })
    }

    pub fn capabilities(&self) -> CapabilitySet {
        resolve_permissions(self.tx.borrow().as_ref().map(|s| &s.user))
    }

    /// The session, if it carries `capability`.
    pub fn require_capability(&self, capability: Capability) -> ApiResult<Session> {
        let session = self.require()?;
        if resolve_permissions(Some(&session.user)).has(capability) {
            Ok(session)
        } else {
            Err(ApiError::permission_denied(capability.key()))
        }
    }

    /// The session, if its user is an owner.
    pub fn require_owner(&self) -> ApiResult<Session> {
        let session = self.require()?;
        if session.user.role.is_owner() {
            Ok(session)
        } else {
            Err(ApiError::permission_denied("owner"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use idcashier_core::{Permissions, Role};

    fn cashier() -> Session {
        let mut user = User::new("c1", "Budi", "budi@toko.id", Role::Cashier);
        user.tenant_id = Some("o1".into());
        user.permissions = Some(Permissions {
            can_apply_discount: true,
            ..Default::default()
        });
        Session::new("token", user)
    }

    #[test]
    fn test_empty_state() {
        let state = SessionState::new();
        assert!(!state.is_signed_in());
        assert_eq!(state.capabilities(), CapabilitySet::none());
        assert_eq!(state.require().unwrap_err().code, ErrorCode::AuthRequired);
    }

    #[test]
    fn test_capability_gate() {
        let state = SessionState::new();
        state.set(cashier());
        assert!(state.require_capability(Capability::CanApplyDiscount).is_ok());
        let err = state.require_capability(Capability::CanExportReports).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(state.require_owner().unwrap_err().code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let state = SessionState::new();
        let mut rx = state.subscribe();

        state.set(cashier());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().user.name, "Budi");

        let changed = state.update_user(UserPatch {
            name: Some("Budi Santoso".into()),
            ..Default::default()
        });
        assert!(changed);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().user.name, "Budi Santoso");

        assert!(!state.update_user(UserPatch::default()));
        assert!(!rx.has_changed().unwrap());

        state.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_update_without_session() {
        let state = SessionState::new();
        assert!(!state.update_user(UserPatch {
            name: Some("x".into()),
            ..Default::default()
        }));
    }
}
