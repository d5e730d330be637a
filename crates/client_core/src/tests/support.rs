use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{Category, Priority, Role, TicketId, TicketStatus, UserId},
    error::{ApiError, ApiResult, ErrorReason},
    protocol::{
        Comment, DashboardStats, FacultyMember, FacultyProfile, LoginRequest, NewComment,
        NewFaculty, NewTicket, SessionUser, Ticket, TicketUpdate,
    },
};
use tokio::sync::Notify;

use crate::{
    gateway::PortalApi,
    presenter::{ConfirmPrompt, FormKind, Notification, Presenter, RenderFrame},
    router::View,
};

pub(crate) fn created_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(10, 15, 0))
        .expect("valid timestamp")
}

pub(crate) fn user(id: i64, role: Role) -> SessionUser {
    SessionUser {
        id: UserId(id),
        username: format!("{}{id}", role.as_str()),
        role,
        full_name: format!("Test {}", role.as_str()),
    }
}

pub(crate) fn ticket(id: i64) -> Ticket {
    Ticket {
        id: TicketId(id),
        category: Category::Facility,
        subject: format!("Ticket {id}"),
        message: "Projector flickers".to_string(),
        priority: Priority::Medium,
        status: TicketStatus::Pending,
        assigned_to: None,
        author_role: "Student User".to_string(),
        created_at: created_at(),
        comments: Vec::new(),
    }
}

pub(crate) fn comment(author: &str, text: &str) -> Comment {
    Comment {
        author_name: author.to_string(),
        text: text.to_string(),
        created_at: created_at(),
    }
}

pub(crate) fn faculty_member(id: i64, name: &str) -> FacultyMember {
    FacultyMember {
        id: UserId(id),
        full_name: name.to_string(),
        email: None,
        phone: None,
    }
}

pub(crate) fn unauthorized() -> ApiError {
    ApiError::new(ErrorReason::Unauthorized, "Not authenticated")
}

/// Polls `check` until it holds or a generous deadline passes.
pub(crate) async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Serves canned data and records every call and request body.
#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashMap<&'static str, ApiError>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
    pub(crate) user: Mutex<Option<SessionUser>>,
    pub(crate) tickets: Mutex<Vec<Ticket>>,
    pub(crate) stats: Mutex<DashboardStats>,
    pub(crate) faculty_profiles: Mutex<Vec<FacultyProfile>>,
    pub(crate) faculty: Mutex<Vec<FacultyMember>>,
    pub(crate) tasks: Mutex<Vec<Ticket>>,
    pub(crate) logins: Mutex<Vec<LoginRequest>>,
    pub(crate) created: Mutex<Vec<NewTicket>>,
    pub(crate) updates: Mutex<Vec<(TicketId, TicketUpdate)>>,
    pub(crate) comments: Mutex<Vec<(TicketId, NewComment)>>,
    pub(crate) added_faculty: Mutex<Vec<NewFaculty>>,
    pub(crate) deleted_faculty: Mutex<Vec<UserId>>,
}

impl FakeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn signed_in(role: Role) -> Arc<Self> {
        let api = Self::default();
        *api.user.lock().expect("user lock") = Some(user(1, role));
        Arc::new(api)
    }

    pub(crate) fn set_user(&self, user: Option<SessionUser>) {
        *self.user.lock().expect("user lock") = user;
    }

    pub(crate) fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.lock().expect("tickets lock") = tickets;
    }

    pub(crate) fn fail(&self, endpoint: &'static str, err: ApiError) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(endpoint, err);
    }

    pub(crate) fn recover(&self, endpoint: &'static str) {
        self.failures.lock().expect("failures lock").remove(endpoint);
    }

    /// Holds the next call to `endpoint` until the returned gate is notified.
    pub(crate) fn gate(&self, endpoint: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .expect("gates lock")
            .insert(endpoint, Arc::clone(&gate));
        gate
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn count(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|call| **call == endpoint)
            .count()
    }

    async fn enter(&self, endpoint: &'static str) -> ApiResult<()> {
        self.calls.lock().expect("calls lock").push(endpoint);
        let gate = self.gates.lock().expect("gates lock").remove(endpoint);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.failures.lock().expect("failures lock").get(endpoint) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn current_user(&self) -> ApiResult<SessionUser> {
        self.user
            .lock()
            .expect("user lock")
            .clone()
            .ok_or_else(unauthorized)
    }
}

#[async_trait]
impl PortalApi for FakeApi {
    async fn session_check(&self) -> ApiResult<SessionUser> {
        self.enter("session_check").await?;
        self.current_user()
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<SessionUser> {
        self.logins.lock().expect("logins lock").push(request.clone());
        self.enter("login").await?;
        self.current_user()
    }

    async fn logout(&self) -> ApiResult<()> {
        self.enter("logout").await
    }

    async fn list_tickets(&self) -> ApiResult<Vec<Ticket>> {
        self.enter("list_tickets").await?;
        Ok(self.tickets.lock().expect("tickets lock").clone())
    }

    async fn ticket_detail(&self, ticket_id: TicketId) -> ApiResult<Ticket> {
        self.enter("ticket_detail").await?;
        self.tickets
            .lock()
            .expect("tickets lock")
            .iter()
            .find(|ticket| ticket.id == ticket_id)
            .cloned()
            .ok_or_else(|| ApiError::new(ErrorReason::NotFound, "Feedback not found"))
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> ApiResult<()> {
        self.created.lock().expect("created lock").push(ticket.clone());
        self.enter("create_ticket").await
    }

    async fn update_ticket(&self, ticket_id: TicketId, update: &TicketUpdate) -> ApiResult<()> {
        self.updates
            .lock()
            .expect("updates lock")
            .push((ticket_id, update.clone()));
        self.enter("update_ticket").await?;
        let mut tickets = self.tickets.lock().expect("tickets lock");
        if let Some(ticket) = tickets.iter_mut().find(|ticket| ticket.id == ticket_id) {
            ticket.status = update.status;
            if let Some(priority) = update.priority {
                ticket.priority = priority;
            }
            if let Some(assignee) = &update.assigned_to {
                ticket.assigned_to = assignee.clone();
            }
        }
        Ok(())
    }

    async fn post_comment(&self, ticket_id: TicketId, posted: &NewComment) -> ApiResult<()> {
        self.comments
            .lock()
            .expect("comments lock")
            .push((ticket_id, posted.clone()));
        self.enter("post_comment").await?;
        let author = self.current_user()?.full_name;
        let mut tickets = self.tickets.lock().expect("tickets lock");
        if let Some(ticket) = tickets.iter_mut().find(|ticket| ticket.id == ticket_id) {
            ticket.comments.push(comment(&author, &posted.comment));
        }
        Ok(())
    }

    async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.enter("dashboard_stats").await?;
        Ok(*self.stats.lock().expect("stats lock"))
    }

    async fn faculty_stats(&self) -> ApiResult<Vec<FacultyProfile>> {
        self.enter("faculty_stats").await?;
        Ok(self.faculty_profiles.lock().expect("profiles lock").clone())
    }

    async fn list_faculty(&self) -> ApiResult<Vec<FacultyMember>> {
        self.enter("list_faculty").await?;
        Ok(self.faculty.lock().expect("faculty lock").clone())
    }

    async fn add_faculty(&self, faculty: &NewFaculty) -> ApiResult<()> {
        self.added_faculty
            .lock()
            .expect("added lock")
            .push(faculty.clone());
        self.enter("add_faculty").await
    }

    async fn delete_faculty(&self, user_id: UserId) -> ApiResult<()> {
        self.deleted_faculty
            .lock()
            .expect("deleted lock")
            .push(user_id);
        self.enter("delete_faculty").await
    }

    async fn assigned_tasks(&self) -> ApiResult<Vec<Ticket>> {
        self.enter("assigned_tasks").await?;
        Ok(self.tasks.lock().expect("tasks lock").clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PresenterEvent {
    ShowLoading,
    HideLoading,
    Render(RenderFrame),
    RenderError(View, ErrorReason),
    AssignedTasks(Vec<TicketId>),
    Notify(Notification),
    ClearForm(FormKind),
    Confirm(String),
}

/// Records every presenter call; confirmation answers are preset.
pub(crate) struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
    confirm_answer: AtomicBool,
}

impl RecordingPresenter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        })
    }

    pub(crate) fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub(crate) fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().expect("events lock").clone()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().expect("events lock").clear();
    }

    pub(crate) fn frames(&self) -> Vec<RenderFrame> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::Render(frame) => Some(frame),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_frame(&self) -> RenderFrame {
        self.frames().pop().expect("at least one render")
    }

    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::Notify(notification) => Some(notification),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_message(&self) -> String {
        self.notifications()
            .pop()
            .map(|notification| notification.message)
            .expect("at least one notification")
    }

    pub(crate) fn assigned_renders(&self) -> Vec<Vec<TicketId>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::AssignedTasks(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    fn show_loading(&self) {
        self.push(PresenterEvent::ShowLoading);
    }

    fn hide_loading(&self) {
        self.push(PresenterEvent::HideLoading);
    }

    fn render(&self, frame: &RenderFrame) {
        self.push(PresenterEvent::Render(frame.clone()));
    }

    fn render_error(&self, view: View, error: &ApiError) {
        self.push(PresenterEvent::RenderError(view, error.reason));
    }

    fn render_assigned_tasks(&self, tasks: &[Ticket]) {
        self.push(PresenterEvent::AssignedTasks(
            tasks.iter().map(|task| task.id).collect(),
        ));
    }

    fn notify(&self, notification: Notification) {
        self.push(PresenterEvent::Notify(notification));
    }

    fn clear_form(&self, form: FormKind) {
        self.push(PresenterEvent::ClearForm(form));
    }

    async fn confirm(&self, prompt: ConfirmPrompt) -> bool {
        self.push(PresenterEvent::Confirm(prompt.title));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}
