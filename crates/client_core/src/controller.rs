use std::sync::Arc;

use shared::{
    domain::{Category, Priority, Role, TicketId, TicketStatus, UserId},
    error::{ApiError, ErrorReason},
    protocol::{NewComment, NewFaculty, NewTicket, SessionUser, Ticket, TicketUpdate},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    gateway::PortalApi,
    orchestrator::{DataOrchestrator, ViewData},
    presenter::{ConfirmPrompt, FormKind, Notification, Presenter, RenderFrame},
    router::{Destination, NavigationTicket, View, ViewRouter, ViewState},
    session::{self, Session, SessionStore},
};

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
const NOT_PERMITTED_MESSAGE: &str = "You are not allowed to perform this action.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("action not permitted for the current session")]
    NotPermitted,
    #[error(transparent)]
    Api(ApiError),
}

impl ActionError {
    pub fn reason(&self) -> Option<ErrorReason> {
        match self {
            ActionError::Validation(_) => Some(ErrorReason::Validation),
            ActionError::NotPermitted => None,
            ActionError::Api(err) => Some(err.reason),
        }
    }
}

impl From<ApiError> for ActionError {
    fn from(err: ApiError) -> Self {
        match err.reason {
            ErrorReason::Validation => ActionError::Validation(err.message),
            _ => ActionError::Api(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The user cancelled the confirmation; nothing was sent.
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Rendered(View),
    /// Required data failed; the error placeholder was rendered.
    Failed(ApiError),
    Rejected,
    /// A newer navigation took over before this load finished.
    Superseded,
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketForm {
    pub category: Category,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FacultyForm {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl FacultyForm {
    fn is_complete(&self) -> bool {
        [
            &self.full_name,
            &self.username,
            &self.email,
            &self.phone,
            &self.password,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Assignment {
    #[default]
    Keep,
    Unassign,
    /// A blank name unassigns.
    Assign(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketUpdateForm {
    pub status: TicketStatus,
    /// `None` keeps the ticket's current priority.
    pub priority: Option<Priority>,
    pub assignee: Assignment,
}

impl TicketUpdateForm {
    /// Faculty may only move the status. A dean always sends the full triage
    /// triple, filled from the ticket on screen where the form leaves a gap.
    fn to_update(&self, role: Role, shown: &Ticket) -> TicketUpdate {
        if !role.can_triage_tickets() {
            return TicketUpdate {
                status: self.status,
                priority: None,
                assigned_to: None,
            };
        }
        let assignee = match &self.assignee {
            Assignment::Keep => shown.assigned_to.clone(),
            Assignment::Unassign => None,
            Assignment::Assign(name) => {
                Some(name.trim().to_string()).filter(|name| !name.is_empty())
            }
        };
        TicketUpdate {
            status: self.status,
            priority: Some(self.priority.unwrap_or(shown.priority)),
            assigned_to: Some(assignee),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalCommand {
    CheckSession,
    Login { username: String, password: String },
    Logout,
    Navigate(Destination),
    ViewDetail(TicketId),
    SubmitTicket(TicketForm),
    AddFaculty(FacultyForm),
    DeleteFaculty { user_id: UserId, name: String },
    PostComment { text: String },
    UpdateTicket(TicketUpdateForm),
}

impl PortalCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PortalCommand::CheckSession => "check_session",
            PortalCommand::Login { .. } => "login",
            PortalCommand::Logout => "logout",
            PortalCommand::Navigate(_) => "navigate",
            PortalCommand::ViewDetail(_) => "view_detail",
            PortalCommand::SubmitTicket(_) => "submit_ticket",
            PortalCommand::AddFaculty(_) => "add_faculty",
            PortalCommand::DeleteFaculty { .. } => "delete_faculty",
            PortalCommand::PostComment { .. } => "post_comment",
            PortalCommand::UpdateTicket(_) => "update_ticket",
        }
    }
}

struct PortalState {
    session: SessionStore,
    /// Bumped each time a session is established or cleared.
    session_epoch: u64,
    router: ViewRouter,
    shown_ticket: Option<Ticket>,
}

impl PortalState {
    fn establish(&mut self, user: SessionUser) -> Destination {
        self.session_epoch += 1;
        self.session.establish(user).landing()
    }
}

/// Who started an action, checked again when its result comes back.
#[derive(Debug, Clone, Copy)]
struct Actor {
    role: Role,
    epoch: u64,
}

pub struct PortalController {
    api: Arc<dyn PortalApi>,
    orchestrator: DataOrchestrator,
    presenter: Arc<dyn Presenter>,
    inner: Mutex<PortalState>,
}

impl PortalController {
    pub fn new(api: Arc<dyn PortalApi>, presenter: Arc<dyn Presenter>) -> Arc<Self> {
        Arc::new(Self {
            orchestrator: DataOrchestrator::new(Arc::clone(&api)),
            api,
            presenter,
            inner: Mutex::new(PortalState {
                session: SessionStore::default(),
                session_epoch: 0,
                router: ViewRouter::new(),
                shown_ticket: None,
            }),
        })
    }

    pub async fn session(&self) -> Option<Session> {
        self.inner.lock().await.session.current().cloned()
    }

    pub async fn view_state(&self) -> ViewState {
        self.inner.lock().await.router.state()
    }

    pub async fn dispatch(
        self: &Arc<Self>,
        command: PortalCommand,
    ) -> Result<ActionOutcome, ActionError> {
        debug!(command = command.name(), "controller: dispatching command");
        match command {
            PortalCommand::CheckSession => {
                self.check_session().await;
                Ok(ActionOutcome::Completed)
            }
            PortalCommand::Login { username, password } => self.login(&username, &password).await,
            PortalCommand::Logout => self.logout().await,
            PortalCommand::Navigate(destination) => {
                self.navigate(destination).await;
                Ok(ActionOutcome::Completed)
            }
            PortalCommand::ViewDetail(ticket_id) => {
                self.view_detail(ticket_id).await;
                Ok(ActionOutcome::Completed)
            }
            PortalCommand::SubmitTicket(form) => self.submit_ticket(form).await,
            PortalCommand::AddFaculty(form) => self.add_faculty(form).await,
            PortalCommand::DeleteFaculty { user_id, name } => {
                self.delete_faculty(user_id, &name).await
            }
            PortalCommand::PostComment { text } => self.post_comment(&text).await,
            PortalCommand::UpdateTicket(form) => self.update_ticket(form).await,
        }
    }

    /// Start-up entry point. Returns the view that ended up on screen.
    pub async fn check_session(self: &Arc<Self>) -> View {
        self.presenter.show_loading();
        let Some(user) = session::check_session(self.api.as_ref()).await else {
            self.reset_to_login().await;
            return View::Login;
        };
        let landing = self.inner.lock().await.establish(user);
        match self.navigate(landing).await {
            NavigationOutcome::SessionExpired => View::Login,
            _ => landing.view(),
        }
    }

    pub async fn login(
        self: &Arc<Self>,
        username: &str,
        password: &str,
    ) -> Result<ActionOutcome, ActionError> {
        let request = match session::login_request(username, password) {
            Ok(request) => request,
            Err(err) => {
                self.presenter
                    .notify(Notification::error(session::login_failure_message(&err)));
                return Err(err.into());
            }
        };

        self.presenter.show_loading();
        let user = match session::login(self.api.as_ref(), &request).await {
            Ok(user) => user,
            Err(err) => {
                self.presenter.hide_loading();
                self.presenter
                    .notify(Notification::error(session::login_failure_message(&err)));
                return Err(ActionError::Api(err));
            }
        };

        let landing = self.inner.lock().await.establish(user);
        self.presenter
            .notify(Notification::success("Login successful! Welcome back."));
        self.presenter.clear_form(FormKind::Login);
        self.navigate(landing).await;
        Ok(ActionOutcome::Completed)
    }

    pub async fn logout(&self) -> Result<ActionOutcome, ActionError> {
        self.require_role(|_| true, "logout").await?;
        if !self.presenter.confirm(ConfirmPrompt::logout()).await {
            info!("controller: logout cancelled");
            return Ok(ActionOutcome::Declined);
        }
        session::logout(self.api.as_ref()).await;
        self.reset_to_login().await;
        self.presenter
            .notify(Notification::success("Logged out successfully"));
        Ok(ActionOutcome::Completed)
    }

    pub async fn navigate(self: &Arc<Self>, destination: Destination) -> NavigationOutcome {
        let ticket = {
            let mut state = self.inner.lock().await;
            let role = state.session.role();
            state.router.navigate(role, destination)
        };
        match ticket {
            Some(ticket) => self.load_and_render(ticket).await,
            None => NavigationOutcome::Rejected,
        }
    }

    pub async fn view_detail(self: &Arc<Self>, ticket_id: TicketId) -> NavigationOutcome {
        self.navigate(Destination::Detail(ticket_id)).await
    }

    pub async fn submit_ticket(
        self: &Arc<Self>,
        form: TicketForm,
    ) -> Result<ActionOutcome, ActionError> {
        if form.subject.trim().is_empty() || form.message.trim().is_empty() {
            return Err(self.reject("Please fill all required fields"));
        }
        let actor = self.require_role(|_| true, "submit_ticket").await?;

        let ticket = NewTicket {
            category: form.category,
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            priority: form.priority,
        };
        self.presenter.show_loading();
        if let Err(err) = self.api.create_ticket(&ticket).await {
            return Err(self.fail(err, "Failed to submit report", actor).await);
        }
        self.presenter.hide_loading();
        self.presenter
            .notify(Notification::success("Report submitted successfully!"));
        self.presenter.clear_form(FormKind::Ticket);

        let follow_up = if actor.role.is_staff() {
            Destination::Dashboard
        } else {
            Destination::MyReports
        };
        self.navigate(follow_up).await;
        Ok(ActionOutcome::Completed)
    }

    pub async fn add_faculty(
        self: &Arc<Self>,
        form: FacultyForm,
    ) -> Result<ActionOutcome, ActionError> {
        if !form.is_complete() {
            return Err(self.reject("Please fill all fields"));
        }
        let actor = self
            .require_role(Role::can_manage_faculty, "add_faculty")
            .await?;

        let faculty = NewFaculty {
            username: form.username.trim().to_string(),
            password: form.password,
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
        };
        self.presenter.show_loading();
        if let Err(err) = self.api.add_faculty(&faculty).await {
            return Err(self.fail(err, "Failed to add faculty", actor).await);
        }
        self.presenter.hide_loading();
        self.presenter
            .notify(Notification::success("Faculty member added successfully!"));
        self.presenter.clear_form(FormKind::Faculty);
        self.navigate(Destination::FacultyManagement).await;
        Ok(ActionOutcome::Completed)
    }

    pub async fn delete_faculty(
        self: &Arc<Self>,
        user_id: UserId,
        name: &str,
    ) -> Result<ActionOutcome, ActionError> {
        let actor = self
            .require_role(Role::can_manage_faculty, "delete_faculty")
            .await?;
        if !self
            .presenter
            .confirm(ConfirmPrompt::delete_faculty(name))
            .await
        {
            info!(user_id = user_id.0, "controller: faculty removal cancelled");
            return Ok(ActionOutcome::Declined);
        }

        self.presenter.show_loading();
        if let Err(err) = self.api.delete_faculty(user_id).await {
            return Err(self.fail(err, "Failed to remove faculty", actor).await);
        }
        self.presenter.hide_loading();
        self.presenter
            .notify(Notification::success("Faculty member removed"));
        self.navigate(Destination::FacultyManagement).await;
        Ok(ActionOutcome::Completed)
    }

    pub async fn post_comment(self: &Arc<Self>, text: &str) -> Result<ActionOutcome, ActionError> {
        if text.trim().is_empty() {
            return Err(self.reject("Please enter a comment"));
        }
        let actor = self.require_role(|_| true, "post_comment").await?;
        let ticket_id = self.open_ticket().await?;

        let comment = NewComment {
            comment: text.trim().to_string(),
        };
        self.presenter.show_loading();
        if let Err(err) = self.api.post_comment(ticket_id, &comment).await {
            return Err(self.fail(err, "Failed to post comment", actor).await);
        }
        self.presenter.hide_loading();
        self.presenter.notify(Notification::success("Comment posted"));
        self.presenter.clear_form(FormKind::Comment);
        self.reload_detail(ticket_id).await;
        Ok(ActionOutcome::Completed)
    }

    pub async fn update_ticket(
        self: &Arc<Self>,
        form: TicketUpdateForm,
    ) -> Result<ActionOutcome, ActionError> {
        let actor = self
            .require_role(Role::can_manage_tickets, "update_ticket")
            .await?;
        let shown = self.shown_ticket().await?;
        let ticket_id = shown.id;

        let update = form.to_update(actor.role, &shown);
        self.presenter.show_loading();
        if let Err(err) = self.api.update_ticket(ticket_id, &update).await {
            return Err(self.fail(err, "Failed to update ticket", actor).await);
        }
        self.presenter.hide_loading();
        self.presenter
            .notify(Notification::success("Ticket updated successfully!"));
        self.reload_detail(ticket_id).await;
        Ok(ActionOutcome::Completed)
    }

    async fn load_and_render(self: &Arc<Self>, ticket: NavigationTicket) -> NavigationOutcome {
        let view = ticket.view();
        if view.requires_data() {
            self.presenter.show_loading();
        }
        let result = self.orchestrator.load(&ticket).await;

        let mut state = self.inner.lock().await;
        if !state.router.is_current(&ticket) {
            debug!(
                view = view.as_str(),
                generation = ticket.generation(),
                "controller: discarding stale view data"
            );
            return NavigationOutcome::Superseded;
        }
        self.presenter.hide_loading();

        state.shown_ticket = match &result {
            Ok(ViewData::Detail(detail)) => Some(detail.ticket.clone()),
            _ => None,
        };
        match result {
            Ok(data) => {
                let role = state.session.role();
                let frame = RenderFrame::new(
                    state.router.state(),
                    state.session.current().cloned(),
                    data,
                );
                self.presenter.render(&frame);
                drop(state);
                if view == View::Dashboard && role == Some(Role::Faculty) {
                    self.spawn_assigned_tasks(ticket);
                }
                NavigationOutcome::Rendered(view)
            }
            Err(err) if err.is_unauthorized() => {
                drop(state);
                self.expire_session().await;
                NavigationOutcome::SessionExpired
            }
            Err(err) => {
                warn!(view = view.as_str(), "controller: view failed to load: {err}");
                self.presenter.render_error(view, &err);
                NavigationOutcome::Failed(err)
            }
        }
    }

    async fn reload_detail(self: &Arc<Self>, ticket_id: TicketId) -> NavigationOutcome {
        let ticket = self.inner.lock().await.router.reload_detail(ticket_id);
        match ticket {
            Some(ticket) => self.load_and_render(ticket).await,
            None => NavigationOutcome::Superseded,
        }
    }

    fn spawn_assigned_tasks(self: &Arc<Self>, ticket: NavigationTicket) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let Some(tasks) = controller.orchestrator.load_assigned_tasks().await else {
                return;
            };
            let state = controller.inner.lock().await;
            if !state.router.is_current(&ticket) {
                debug!("controller: dashboard left before assigned tasks arrived");
                return;
            }
            controller.presenter.render_assigned_tasks(&tasks);
        });
    }

    async fn open_ticket(&self) -> Result<TicketId, ActionError> {
        let state = self.inner.lock().await.router.state();
        match (state.current, state.selected_ticket) {
            (View::Detail, Some(ticket_id)) => Ok(ticket_id),
            _ => Err(self.reject("Open a ticket first")),
        }
    }

    /// The detail ticket as last rendered, if it is still the one on screen.
    async fn shown_ticket(&self) -> Result<Ticket, ActionError> {
        let shown = {
            let state = self.inner.lock().await;
            let view = state.router.state();
            match (view.current, view.selected_ticket, &state.shown_ticket) {
                (View::Detail, Some(id), Some(ticket)) if ticket.id == id => {
                    Some(ticket.clone())
                }
                _ => None,
            }
        };
        shown.ok_or_else(|| self.reject("Open a ticket first"))
    }

    async fn require_role(
        &self,
        allowed: impl Fn(Role) -> bool,
        action: &'static str,
    ) -> Result<Actor, ActionError> {
        let (role, epoch) = {
            let state = self.inner.lock().await;
            (state.session.role(), state.session_epoch)
        };
        match role {
            Some(role) if allowed(role) => Ok(Actor { role, epoch }),
            _ => {
                warn!(
                    action,
                    role = role.map(Role::as_str).unwrap_or("anonymous"),
                    "controller: action not permitted"
                );
                self.presenter
                    .notify(Notification::error(NOT_PERMITTED_MESSAGE));
                Err(ActionError::NotPermitted)
            }
        }
    }

    fn reject(&self, message: &str) -> ActionError {
        self.presenter.notify(Notification::error(message));
        ActionError::Validation(message.to_string())
    }

    /// Results for a session that has since ended are only logged.
    async fn fail(&self, err: ApiError, context: &str, actor: Actor) -> ActionError {
        if self.inner.lock().await.session_epoch != actor.epoch {
            debug!("controller: {context} for an earlier session: {err}");
            return ActionError::Api(err);
        }
        self.presenter.hide_loading();
        if err.is_unauthorized() {
            self.expire_session().await;
        } else {
            warn!("controller: {context}: {err}");
            self.presenter
                .notify(Notification::error(format!("{context}: {}", err.message)));
        }
        ActionError::Api(err)
    }

    async fn expire_session(&self) {
        warn!("controller: server rejected the session credential");
        self.reset_to_login().await;
        self.presenter
            .notify(Notification::error(SESSION_EXPIRED_MESSAGE));
    }

    async fn reset_to_login(&self) {
        let mut state = self.inner.lock().await;
        state.session.clear();
        state.session_epoch += 1;
        state.shown_ticket = None;
        state.router.reset();
        self.presenter.hide_loading();
        self.presenter.render(&RenderFrame::login());
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
