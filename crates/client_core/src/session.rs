use shared::{
    domain::{Role, UserId},
    error::{ApiError, ErrorReason},
    protocol::{LoginRequest, SessionUser},
};
use tracing::{info, warn};

use crate::{gateway::PortalApi, router::Destination};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    /// Students land on the submission form, staff on the dashboard.
    pub fn landing(&self) -> Destination {
        landing_for(self.role)
    }
}

pub fn landing_for(role: Role) -> Destination {
    match role {
        Role::Student => Destination::Create,
        Role::Dean | Role::Faculty => Destination::Dashboard,
    }
}

impl From<SessionUser> for Session {
    fn from(user: SessionUser) -> Self {
        let display_name = if user.full_name.trim().is_empty() {
            user.username.clone()
        } else {
            user.full_name
        };
        Self {
            user_id: user.id,
            username: user.username,
            display_name,
            role: user.role,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
}

impl SessionStore {
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().map(|session| session.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Replaces any previous identity.
    pub fn establish(&mut self, user: SessionUser) -> &Session {
        let session = Session::from(user);
        info!(
            user_id = session.user_id.0,
            role = session.role.as_str(),
            "session: established"
        );
        self.current.insert(session)
    }

    pub fn clear(&mut self) -> Option<Session> {
        let previous = self.current.take();
        if let Some(session) = &previous {
            info!(user_id = session.user_id.0, "session: cleared");
        }
        previous
    }
}

/// Local check; no request is built for blank credentials.
pub fn login_request(username: &str, password: &str) -> Result<LoginRequest, ApiError> {
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }
    Ok(LoginRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
    })
}

/// Invalid credentials and transport failures differ only in wording.
pub fn login_failure_message(err: &ApiError) -> &'static str {
    match err.reason {
        ErrorReason::Validation => "Please enter both username and password",
        ErrorReason::Unauthorized => "Invalid credentials. Please try again.",
        _ => "Login failed. Please try again.",
    }
}

/// Every failure collapses to "no session".
pub async fn check_session(api: &dyn PortalApi) -> Option<SessionUser> {
    match api.session_check().await {
        Ok(user) => Some(user),
        Err(err) if err.is_unauthorized() => {
            info!("session: no active session");
            None
        }
        Err(err) => {
            warn!("session: session check failed: {err}");
            None
        }
    }
}

pub async fn login(api: &dyn PortalApi, request: &LoginRequest) -> Result<SessionUser, ApiError> {
    api.login(request).await.inspect_err(|err| {
        if !err.is_unauthorized() {
            warn!("session: login failed: {err}");
        }
    })
}

/// Best effort; the local session is dropped by the caller either way.
pub async fn logout(api: &dyn PortalApi) {
    if let Err(err) = api.logout().await {
        warn!("session: remote logout failed: {err}");
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
