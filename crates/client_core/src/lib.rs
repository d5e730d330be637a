//! Client-side state machine for the campus feedback portal.

pub mod controller;
pub mod gateway;
pub mod orchestrator;
pub mod presenter;
pub mod router;
pub mod session;

pub use controller::{
    ActionError, ActionOutcome, Assignment, FacultyForm, NavigationOutcome, PortalCommand, PortalController,
    TicketForm, TicketUpdateForm,
};
pub use gateway::{HttpGateway, PortalApi};
pub use orchestrator::{DashboardData, DataOrchestrator, DetailData, ViewData};
pub use presenter::{
    Capabilities, ConfirmPrompt, FormKind, Notification, NotificationLevel, Presenter,
    RenderFrame,
};
pub use router::{Destination, NavigationTicket, View, ViewRouter, ViewState};
pub use session::{Session, SessionStore};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
