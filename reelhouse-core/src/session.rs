//! The signed-in user, as supplied by whatever authenticates the caller.
//!
//! Services never look the user up themselves; they take a `user_id`
//! argument and the entry points resolve it through [`require_user`].

use uuid::Uuid;

use crate::error::{CoreError, Result};

pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<Uuid>;
}

/// A fixed session, e.g. a user id passed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticSession(Option<Uuid>);

impl StaticSession {
    pub fn signed_in(user_id: Uuid) -> Self {
        Self(Some(user_id))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<Uuid> {
        self.0
    }
}

pub fn require_user(session: &dyn SessionProvider) -> Result<Uuid> {
    session.current_user().ok_or(CoreError::Unauthenticated)
}
