use std::sync::Arc;

use rest_client::{ApiError, CredentialSource};
use tracing::{debug, warn};

use crate::contract::model::User;
use crate::session::store::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// An authenticated session: bearer token plus the user snapshot the server
/// returned with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(s) => Some(&s.user),
            SessionState::Anonymous => None,
        }
    }
}

/// Holder of the persisted `(token, user)` pair.
///
/// Cheap to clone; all clones share the same backing store. The request
/// pipeline reads the token from here and clears it when the server answers
/// 401.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Stored user, or `None` when nobody is logged in.
    ///
    /// Data that exists but does not decode is reported as
    /// [`ApiError::CorruptedSession`] rather than treated as absent.
    pub fn current_user(&self) -> Result<Option<User>, ApiError> {
        match self.store.get(USER_KEY)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                ApiError::corrupted_session(format!("stored user cannot be decoded: {e}"))
            }),
        }
    }

    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.token()?.is_some())
    }

    pub fn state(&self) -> Result<SessionState, ApiError> {
        let token = self.token()?;
        let user = self.current_user()?;
        match (token, user) {
            (Some(token), Some(user)) => Ok(SessionState::Authenticated(Session { token, user })),
            (None, None) => Ok(SessionState::Anonymous),
            (Some(_), None) => Err(ApiError::corrupted_session(
                "token is stored without a user",
            )),
            (None, Some(_)) => Err(ApiError::corrupted_session(
                "user is stored without a token",
            )),
        }
    }

    /// Store a fresh session. The user is written first; if the token cannot
    /// be written the user entry is removed again.
    pub fn persist(&self, token: &str, user: &User) -> Result<(), ApiError> {
        let raw = serde_json::to_string(user)
            .map_err(|e| ApiError::storage(format!("cannot encode user: {e}")))?;
        self.store.set(USER_KEY, &raw)?;

        if let Err(e) = self.store.set(TOKEN_KEY, token) {
            if let Err(rollback) = self.store.remove(USER_KEY) {
                warn!(error = %rollback, "failed to roll back user after token write error");
            }
            return Err(e);
        }
        debug!(user_id = user.id, role = %user.role, "session persisted");
        Ok(())
    }

    /// Replace the stored user while keeping the token.
    pub fn replace_user(&self, user: &User) -> Result<(), ApiError> {
        let raw = serde_json::to_string(user)
            .map_err(|e| ApiError::storage(format!("cannot encode user: {e}")))?;
        self.store.set(USER_KEY, &raw)
    }

    /// Remove token, then user. Safe to call with no session.
    pub fn clear(&self) -> Result<(), ApiError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        debug!("session cleared");
        Ok(())
    }
}

impl CredentialSource for SessionContext {
    fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        self.token()
    }

    fn invalidate(&self) -> Result<(), ApiError> {
        self.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::Role;
    use crate::session::store::MemoryStore;
    use parking_lot::Mutex;

    fn sample_user() -> User {
        User {
            id: 42,
            username: "9998887777".into(),
            email: "pat@example.com".into(),
            role: Role::Patient,
            first_name: "Pat".into(),
            last_name: "Doe".into(),
            phone_number: Some("9998887777".into()),
            created_at: None,
            updated_at: None,
        }
    }

    fn memory_session() -> (SessionContext, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (SessionContext::new(store.clone()), store)
    }

    #[test]
    fn persist_then_read_back() {
        let (session, _) = memory_session();
        session.persist("tok", &sample_user()).unwrap();

        assert_eq!(session.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(session.current_user().unwrap(), Some(sample_user()));
        assert!(session.is_authenticated().unwrap());
        assert_eq!(
            session.state().unwrap(),
            SessionState::Authenticated(Session {
                token: "tok".into(),
                user: sample_user(),
            })
        );
    }

    #[test]
    fn clear_is_idempotent() {
        let (session, _) = memory_session();
        session.persist("tok", &sample_user()).unwrap();

        session.clear().unwrap();
        session.clear().unwrap();

        assert!(!session.is_authenticated().unwrap());
        assert_eq!(session.current_user().unwrap(), None);
        assert_eq!(session.state().unwrap(), SessionState::Anonymous);
    }

    #[test]
    fn corrupted_user_is_reported() {
        let (session, store) = memory_session();
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, "{not json").unwrap();

        let err = session.current_user().unwrap_err();
        assert!(matches!(err, ApiError::CorruptedSession { .. }));
        assert!(session.state().is_err());
        // the token alone still answers is_authenticated
        assert!(session.is_authenticated().unwrap());
    }

    #[test]
    fn half_written_session_is_corrupted() {
        let (session, store) = memory_session();
        store.set(TOKEN_KEY, "tok").unwrap();
        assert!(matches!(
            session.state().unwrap_err(),
            ApiError::CorruptedSession { .. }
        ));
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let (session, store) = memory_session();
        store.set(TOKEN_KEY, "").unwrap();
        assert!(!session.is_authenticated().unwrap());
        assert_eq!(session.bearer_token().unwrap(), None);
    }

    #[test]
    fn invalidate_clears_everything() {
        let (session, _) = memory_session();
        session.persist("tok", &sample_user()).unwrap();
        session.invalidate().unwrap();
        assert_eq!(session.state().unwrap(), SessionState::Anonymous);
    }

    /// Store whose token writes always fail.
    #[derive(Default)]
    struct FailingTokenStore {
        inner: MemoryStore,
        removed: Mutex<Vec<String>>,
    }

    impl KeyValueStore for FailingTokenStore {
        fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
            if key == TOKEN_KEY {
                return Err(ApiError::storage("disk full"));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), ApiError> {
            self.removed.lock().push(key.to_string());
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_token_write_rolls_back_user() {
        let store = Arc::new(FailingTokenStore::default());
        let session = SessionContext::new(store.clone());

        let err = session.persist("tok", &sample_user()).unwrap_err();

        assert!(matches!(err, ApiError::Storage { .. }));
        assert_eq!(session.current_user().unwrap(), None);
        assert_eq!(*store.removed.lock(), vec![USER_KEY.to_string()]);
        assert_eq!(session.state().unwrap(), SessionState::Anonymous);
    }
}
