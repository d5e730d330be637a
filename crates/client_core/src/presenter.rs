use async_trait::async_trait;
use shared::{domain::Role, error::ApiError, protocol::Ticket};

use crate::{
    orchestrator::ViewData,
    router::{self, View, ViewState},
    session::Session,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub body: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmPrompt {
    pub fn logout() -> Self {
        Self {
            title: "Confirm Logout".to_string(),
            body: "Are you sure you want to log out of your session?".to_string(),
            confirm_label: "Logout".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }

    pub fn delete_faculty(name: &str) -> Self {
        Self {
            title: "Delete Faculty Member".to_string(),
            body: format!(
                "Are you sure you want to remove {name}? All their assigned tasks will be unassigned."
            ),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Transient input groups the presenter clears after a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Ticket,
    Faculty,
    Comment,
}

/// Controls a presenter may show. Advisory only; the controller re-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub submit_tickets: bool,
    pub update_status: bool,
    pub set_priority: bool,
    pub assign: bool,
    pub manage_faculty: bool,
}

impl Capabilities {
    pub fn for_role(role: Option<Role>) -> Self {
        let Some(role) = role else {
            return Self::default();
        };
        Self {
            submit_tickets: true,
            update_status: role.can_manage_tickets(),
            set_priority: role.can_triage_tickets(),
            assign: role.can_triage_tickets(),
            manage_faculty: role.can_manage_faculty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub view: ViewState,
    pub session: Option<Session>,
    pub menu: Vec<View>,
    pub capabilities: Capabilities,
    pub data: ViewData,
}

impl RenderFrame {
    pub fn new(view: ViewState, session: Option<Session>, data: ViewData) -> Self {
        let role = session.as_ref().map(|session| session.role);
        Self {
            view,
            menu: role.map(router::menu).unwrap_or_default(),
            capabilities: Capabilities::for_role(role),
            session,
            data,
        }
    }

    pub fn login() -> Self {
        Self::new(ViewState::default(), None, ViewData::Login)
    }
}

#[async_trait]
pub trait Presenter: Send + Sync {
    fn show_loading(&self);
    fn hide_loading(&self);
    fn render(&self, frame: &RenderFrame);
    /// Placeholder shown instead of a view whose required data failed to load.
    fn render_error(&self, view: View, error: &ApiError);
    fn render_assigned_tasks(&self, tasks: &[Ticket]);
    fn notify(&self, notification: Notification);
    fn clear_form(&self, form: FormKind);
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool;
}
