use serde::{Deserialize, Serialize};

/// Who is looking at the feed. Anonymous viewers can browse but not vote or save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub user_id: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Identity established by a verified magic code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
}

impl From<&AuthSession> for Viewer {
    fn from(session: &AuthSession) -> Self {
        Viewer::signed_in(session.user_id.clone())
    }
}
