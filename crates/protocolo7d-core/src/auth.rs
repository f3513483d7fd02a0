//! Session state mirrored into device-local storage.
//!
//! Two string entries survive restarts: the signed-in email and whether
//! onboarding is done. There is no transaction between them; a crash between
//! the two writes can leave them inconsistent, which is accepted.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::KeyValueStore;

pub const EMAIL_KEY: &str = "userEmail";
pub const ONBOARDED_KEY: &str = "isOnboarded";

/// Who is signed in. `is_onboarded` only means something when `email` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: Option<String>,
    pub is_onboarded: bool,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.email.is_some()
    }
}

/// In-memory session plus the store it is mirrored into.
pub struct AuthState<S: KeyValueStore> {
    session: Session,
    store: S,
}

impl<S: KeyValueStore> AuthState<S> {
    /// Empty session; call [`AuthState::restore`] to pick up a stored one.
    pub fn new(store: S) -> Self {
        Self {
            session: Session::default(),
            store,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn email(&self) -> Option<&str> {
        self.session.email.as_deref()
    }

    pub fn is_onboarded(&self) -> bool {
        self.session.is_onboarded
    }

    /// Remember `email` as the signed-in identity. The caller validates it.
    ///
    /// # Errors
    /// Returns an error if the store write fails; memory is already updated.
    pub fn set_identity(&mut self, email: &str) -> Result<(), StoreError> {
        self.session.email = Some(email.to_string());
        self.store.set(EMAIL_KEY, email)
    }

    /// # Errors
    /// Returns an error if the store write fails; memory is already updated.
    pub fn set_onboarding_complete(&mut self, flag: bool) -> Result<(), StoreError> {
        self.session.is_onboarded = flag;
        self.store.set(ONBOARDED_KEY, flag_value(flag))
    }

    /// Adopt a freshly signed-in identity together with its onboarding flag.
    ///
    /// Both fields change in memory before either store write, so a failed
    /// write never leaves the new email paired with the previous flag.
    ///
    /// # Errors
    /// Returns the first store failure; memory is already updated.
    pub fn sign_in(&mut self, email: &str, is_onboarded: bool) -> Result<(), StoreError> {
        self.session = Session {
            email: Some(email.to_string()),
            is_onboarded,
        };
        self.store.set(EMAIL_KEY, email)?;
        self.store.set(ONBOARDED_KEY, flag_value(is_onboarded))
    }

    /// Load the stored session. A failed read counts as "nothing stored".
    pub fn restore(&mut self) {
        match self.read_stored() {
            Ok(Some(stored)) => self.session = stored,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not read stored session"),
        }
    }

    fn read_stored(&self) -> Result<Option<Session>, StoreError> {
        let email = self.store.get(EMAIL_KEY)?;
        let onboarded = self.store.get(ONBOARDED_KEY)?;
        Ok(email.filter(|e| !e.is_empty()).map(|email| Session {
            email: Some(email),
            is_onboarded: onboarded.as_deref() == Some("true"),
        }))
    }

    /// Forget the session both on disk and in memory.
    ///
    /// # Errors
    /// Returns an error if the stored keys cannot be removed; memory is left
    /// untouched in that case.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove_many(&[EMAIL_KEY, ONBOARDED_KEY])?;
        self.session = Session::default();
        Ok(())
    }
}

fn flag_value(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}
