use std::sync::Arc;

use shared::{
    domain::TicketId,
    error::{ApiError, ApiResult},
    protocol::{DashboardStats, FacultyMember, FacultyProfile, Ticket},
};
use tracing::warn;

use crate::{
    gateway::PortalApi,
    router::{NavigationTicket, View},
};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailData {
    pub ticket: Ticket,
    pub faculty: Vec<FacultyMember>,
    /// The faculty list could not be fetched; `faculty` is empty.
    pub faculty_degraded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Login,
    Create,
    Dashboard(DashboardData),
    FacultyManagement(Vec<FacultyProfile>),
    Detail(DetailData),
    MyReports(Vec<Ticket>),
}

#[derive(Clone)]
pub struct DataOrchestrator {
    api: Arc<dyn PortalApi>,
}

impl DataOrchestrator {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self { api }
    }

    pub async fn load(&self, ticket: &NavigationTicket) -> ApiResult<ViewData> {
        match ticket.view() {
            View::Login => Ok(ViewData::Login),
            View::Create => Ok(ViewData::Create),
            View::Dashboard => self.load_dashboard().await.map(ViewData::Dashboard),
            View::FacultyManagement => self
                .api
                .faculty_stats()
                .await
                .map(ViewData::FacultyManagement),
            View::Detail => {
                let ticket_id = ticket
                    .selected_ticket()
                    .ok_or_else(|| ApiError::validation("no ticket selected"))?;
                self.load_detail(ticket_id).await.map(ViewData::Detail)
            }
            View::MyReports => self.api.list_tickets().await.map(ViewData::MyReports),
        }
    }

    /// Stats and tickets are independent; the view needs both.
    async fn load_dashboard(&self) -> ApiResult<DashboardData> {
        let (stats, tickets) = futures::join!(self.api.dashboard_stats(), self.api.list_tickets());
        if let Err(err) = &stats {
            warn!("orchestrator: dashboard stats failed: {err}");
        }
        if let Err(err) = &tickets {
            warn!("orchestrator: dashboard ticket list failed: {err}");
        }
        Ok(DashboardData {
            stats: stats?,
            tickets: tickets?,
        })
    }

    async fn load_detail(&self, ticket_id: TicketId) -> ApiResult<DetailData> {
        let ticket = self.api.ticket_detail(ticket_id).await?;
        let (faculty, faculty_degraded) = match self.api.list_faculty().await {
            Ok(faculty) => (faculty, false),
            Err(err) => {
                warn!(
                    ticket_id = ticket_id.0,
                    "orchestrator: faculty list unavailable, rendering detail without it: {err}"
                );
                (Vec::new(), true)
            }
        };
        Ok(DetailData {
            ticket,
            faculty,
            faculty_degraded,
        })
    }

    /// Background region of the faculty dashboard; failures only get logged.
    pub async fn load_assigned_tasks(&self) -> Option<Vec<Ticket>> {
        match self.api.assigned_tasks().await {
            Ok(tasks) => Some(tasks),
            Err(err) => {
                warn!("orchestrator: assigned tasks unavailable: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
