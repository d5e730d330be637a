use std::{
    fmt::Write as _,
    io::Write as _,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use client_core::{
    ConfirmPrompt, DashboardData, DetailData, FormKind, Notification, NotificationLevel,
    Presenter, RenderFrame, View, ViewData,
};
use shared::{
    error::ApiError,
    protocol::{FacultyProfile, Ticket},
};
use tokio::{
    io::{BufReader, Lines, Stdin},
    sync::Mutex,
};
use tracing::warn;

pub type SharedInput = Arc<Mutex<Lines<BufReader<Stdin>>>>;

pub struct TerminalPresenter {
    assume_yes: bool,
    input: SharedInput,
    loading: AtomicBool,
}

impl TerminalPresenter {
    pub fn new(assume_yes: bool, input: SharedInput) -> Self {
        Self {
            assume_yes,
            input,
            loading: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    fn show_loading(&self) {
        if !self.loading.swap(true, Ordering::SeqCst) {
            println!("loading...");
        }
    }

    fn hide_loading(&self) {
        self.loading.store(false, Ordering::SeqCst);
    }

    fn render(&self, frame: &RenderFrame) {
        println!("{}", format_frame(frame));
    }

    fn render_error(&self, view: View, error: &ApiError) {
        println!("{}", format_load_error(view, error));
    }

    fn render_assigned_tasks(&self, tasks: &[Ticket]) {
        println!("{}", format_assigned_tasks(tasks));
    }

    fn notify(&self, notification: Notification) {
        println!("{}", format_notification(&notification));
    }

    fn clear_form(&self, _form: FormKind) {}

    async fn confirm(&self, prompt: ConfirmPrompt) -> bool {
        println!("{}: {}", prompt.title, prompt.body);
        if self.assume_yes {
            println!("{} (assumed)", prompt.confirm_label);
            return true;
        }
        print!("{}? [y/N] ", prompt.confirm_label);
        let _ = std::io::stdout().flush();

        let answer = match self.input.lock().await.next_line().await {
            Ok(line) => line.unwrap_or_default(),
            Err(err) => {
                warn!("terminal: failed to read confirmation: {err}");
                String::new()
            }
        };
        is_yes(&answer)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn format_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {}", notification.message)
}

pub fn format_load_error(view: View, error: &ApiError) -> String {
    format!("[{view}] could not be loaded: {}", error.message)
}

pub fn format_frame(frame: &RenderFrame) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", frame.view.current);
    if let Some(session) = &frame.session {
        let menu: Vec<&str> = frame.menu.iter().map(|view| view.as_str()).collect();
        let _ = writeln!(
            out,
            "signed in as {} ({}) | menu: {}",
            session.display_name,
            session.role,
            menu.join(", ")
        );
    }

    match &frame.data {
        ViewData::Login => out.push_str("Sign in with: login <username> <password>"),
        ViewData::Create => {
            out.push_str("Submit a report: submit <category> <priority> <subject> | <message>")
        }
        ViewData::Dashboard(dashboard) => write_dashboard(&mut out, dashboard),
        ViewData::FacultyManagement(profiles) => write_faculty(&mut out, profiles),
        ViewData::Detail(detail) => write_detail(&mut out, detail, frame),
        ViewData::MyReports(tickets) => write_tickets(&mut out, tickets),
    }
    out.trim_end().to_string()
}

pub fn format_assigned_tasks(tasks: &[Ticket]) -> String {
    let mut out = String::from("-- my assigned tasks --\n");
    write_tickets(&mut out, tasks);
    out.trim_end().to_string()
}

fn write_dashboard(out: &mut String, dashboard: &DashboardData) {
    let stats = &dashboard.stats;
    let _ = writeln!(
        out,
        "total {} | pending {} | processing {} | resolved {}",
        stats.total, stats.pending, stats.processing, stats.resolved
    );
    write_tickets(out, &dashboard.tickets);
}

fn write_tickets(out: &mut String, tickets: &[Ticket]) {
    if tickets.is_empty() {
        out.push_str("(no tickets)\n");
        return;
    }
    for ticket in tickets {
        let _ = writeln!(
            out,
            "#{:<4} {:<10} {:<8} {:<14} {} ({})",
            ticket.id.0,
            ticket.status.as_str(),
            ticket.priority.as_str(),
            ticket.category.as_str(),
            ticket.subject,
            ticket.created_at.format("%Y-%m-%d"),
        );
    }
}

fn write_faculty(out: &mut String, profiles: &[FacultyProfile]) {
    if profiles.is_empty() {
        out.push_str("(no faculty members)\n");
        return;
    }
    for profile in profiles {
        let _ = writeln!(
            out,
            "[{}] {} <{}> assigned {} | resolved {} | pending {}",
            profile.id,
            profile.name,
            profile.email.as_deref().unwrap_or("no email"),
            profile.total_assigned,
            profile.resolved,
            profile.pending,
        );
    }
}

fn write_detail(out: &mut String, detail: &DetailData, frame: &RenderFrame) {
    let ticket = &detail.ticket;
    let _ = writeln!(out, "#{} {}", ticket.id, ticket.subject);
    let _ = writeln!(
        out,
        "{} | {} priority | {} | by {}",
        ticket.category, ticket.priority, ticket.status, ticket.author_role
    );
    let _ = writeln!(
        out,
        "assigned to: {}",
        ticket.assigned_to.as_deref().unwrap_or("unassigned")
    );
    let _ = writeln!(out, "\n{}\n", ticket.message);

    if ticket.comments.is_empty() {
        out.push_str("no comments yet\n");
    }
    for comment in &ticket.comments {
        let _ = writeln!(
            out,
            "  {} ({}): {}",
            comment.author_name,
            comment.created_at.format("%Y-%m-%d %H:%M"),
            comment.text
        );
    }

    if frame.capabilities.assign {
        if detail.faculty_degraded {
            out.push_str("faculty list unavailable\n");
        } else {
            let names: Vec<&str> = detail
                .faculty
                .iter()
                .map(|member| member.full_name.as_str())
                .collect();
            let _ = writeln!(out, "assignable: {}", names.join(", "));
        }
    }
    if frame.capabilities.update_status {
        out.push_str("update with: update <status> [<priority>] [<assignee>|-]\n");
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
