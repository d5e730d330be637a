use std::fmt;

use shared::domain::{Role, TicketId};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Dashboard,
    FacultyManagement,
    Create,
    Detail,
    MyReports,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Login => "login",
            View::Dashboard => "dashboard",
            View::FacultyManagement => "faculty_management",
            View::Create => "create",
            View::Detail => "detail",
            View::MyReports => "my_reports",
        }
    }

    pub fn requires_data(self) -> bool {
        matches!(
            self,
            View::Dashboard | View::FacultyManagement | View::Detail | View::MyReports
        )
    }

    pub fn is_reachable_by(self, role: Role) -> bool {
        match self {
            View::Login => false,
            View::Dashboard => role.is_staff(),
            View::FacultyManagement => role.can_manage_faculty(),
            View::Create | View::Detail | View::MyReports => true,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation target. Detail always carries the ticket it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Dashboard,
    FacultyManagement,
    Create,
    MyReports,
    Detail(TicketId),
}

impl Destination {
    pub fn view(self) -> View {
        match self {
            Destination::Dashboard => View::Dashboard,
            Destination::FacultyManagement => View::FacultyManagement,
            Destination::Create => View::Create,
            Destination::MyReports => View::MyReports,
            Destination::Detail(_) => View::Detail,
        }
    }

    /// Destination for a view that needs no extra parameters.
    pub fn for_view(view: View) -> Option<Self> {
        match view {
            View::Dashboard => Some(Destination::Dashboard),
            View::FacultyManagement => Some(Destination::FacultyManagement),
            View::Create => Some(Destination::Create),
            View::MyReports => Some(Destination::MyReports),
            View::Login | View::Detail => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub current: View,
    pub selected_ticket: Option<TicketId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            current: View::Login,
            selected_ticket: None,
        }
    }
}

/// Snapshot a data load was issued for. Results are applied only while it is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
    state: ViewState,
}

impl NavigationTicket {
    pub fn view(&self) -> View {
        self.state.current
    }

    pub fn selected_ticket(&self) -> Option<TicketId> {
        self.state.selected_ticket
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct ViewRouter {
    state: ViewState,
    generation: u64,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Returns `None` and leaves state untouched when the role cannot reach the destination.
    pub fn navigate(
        &mut self,
        role: Option<Role>,
        destination: Destination,
    ) -> Option<NavigationTicket> {
        let target = destination.view();
        let Some(role) = role else {
            debug!(view = target.as_str(), "router: navigation without session ignored");
            return None;
        };
        if !target.is_reachable_by(role) {
            debug!(
                view = target.as_str(),
                role = role.as_str(),
                "router: navigation not permitted for role"
            );
            return None;
        }

        self.state.current = target;
        if let Destination::Detail(ticket_id) = destination {
            self.state.selected_ticket = Some(ticket_id);
        }
        info!(
            view = target.as_str(),
            selected_ticket = self.state.selected_ticket.map(|id| id.0),
            "router: navigated"
        );
        Some(self.issue())
    }

    /// Fresh ticket for the detail view of `ticket_id`, if it is still on screen.
    pub fn reload_detail(&mut self, ticket_id: TicketId) -> Option<NavigationTicket> {
        if self.state.current != View::Detail || self.state.selected_ticket != Some(ticket_id) {
            debug!(ticket_id = ticket_id.0, "router: detail no longer current; reload skipped");
            return None;
        }
        Some(self.issue())
    }

    pub fn reset(&mut self) -> NavigationTicket {
        self.state = ViewState::default();
        info!("router: reset to login");
        self.issue()
    }

    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        ticket.generation == self.generation && ticket.state == self.state
    }

    fn issue(&mut self) -> NavigationTicket {
        self.generation += 1;
        NavigationTicket {
            generation: self.generation,
            state: self.state,
        }
    }
}

/// Sidebar entries in display order.
pub fn menu(role: Role) -> Vec<View> {
    match role {
        Role::Student => vec![View::Create, View::MyReports],
        Role::Faculty => vec![View::Dashboard, View::Create],
        Role::Dean => vec![View::Dashboard, View::FacultyManagement, View::Create],
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
