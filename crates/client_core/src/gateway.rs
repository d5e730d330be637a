use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{TicketId, UserId},
    error::{ApiError, ApiResult, ErrorReason},
    protocol::{
        Ack, DashboardStats, ErrorBody, FacultyMember, FacultyProfile, LoginRequest, NewComment,
        NewFaculty, NewTicket, SessionResponse, SessionUser, Ticket, TicketUpdate,
    },
};
use tracing::debug;
use url::Url;

#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn session_check(&self) -> ApiResult<SessionUser>;
    async fn login(&self, request: &LoginRequest) -> ApiResult<SessionUser>;
    async fn logout(&self) -> ApiResult<()>;
    async fn list_tickets(&self) -> ApiResult<Vec<Ticket>>;
    async fn ticket_detail(&self, ticket_id: TicketId) -> ApiResult<Ticket>;
    async fn create_ticket(&self, ticket: &NewTicket) -> ApiResult<()>;
    async fn update_ticket(&self, ticket_id: TicketId, update: &TicketUpdate) -> ApiResult<()>;
    async fn post_comment(&self, ticket_id: TicketId, comment: &NewComment) -> ApiResult<()>;
    async fn dashboard_stats(&self) -> ApiResult<DashboardStats>;
    async fn faculty_stats(&self) -> ApiResult<Vec<FacultyProfile>>;
    async fn list_faculty(&self) -> ApiResult<Vec<FacultyMember>>;
    async fn add_faculty(&self, faculty: &NewFaculty) -> ApiResult<()>;
    async fn delete_faculty(&self, user_id: UserId) -> ApiResult<()>;
    async fn assigned_tasks(&self) -> ApiResult<Vec<Ticket>>;
}

/// Cookie-credentialed client for the portal's JSON API.
pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .with_context(|| format!("invalid portal base url '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("portal base url must use http:// or https://"));
        }
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .context("failed to build portal http client")?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::network(format!("request failed: {err}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::network(format!("failed to read response body: {err}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            debug!(status = status.as_u16(), "portal api: request rejected");
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        serde_json::from_str(&body)
            .map_err(|err| ApiError::server(format!("malformed response body: {err}")))
    }

    async fn send_ack(&self, request: RequestBuilder) -> ApiResult<()> {
        let ack: Ack = self.send(request).await?;
        if ack.success {
            Ok(())
        } else {
            Err(ApiError::server(
                ack.error
                    .unwrap_or_else(|| "request was rejected by the server".to_string()),
            ))
        }
    }
}

fn session_user(response: SessionResponse, reason_if_missing: ErrorReason) -> ApiResult<SessionUser> {
    match response {
        SessionResponse {
            success: true,
            user: Some(user),
            ..
        } => Ok(user),
        SessionResponse { error, .. } => Err(ApiError::new(
            reason_if_missing,
            error.unwrap_or_else(|| "no active session".to_string()),
        )),
    }
}

#[async_trait]
impl PortalApi for HttpGateway {
    async fn session_check(&self) -> ApiResult<SessionUser> {
        let response: SessionResponse = self.send(self.http.get(self.url("/api/session"))).await?;
        session_user(response, ErrorReason::Unauthorized)
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<SessionUser> {
        let response: SessionResponse = self
            .send(self.http.post(self.url("/api/login")).json(request))
            .await?;
        session_user(response, ErrorReason::Unauthorized)
    }

    async fn logout(&self) -> ApiResult<()> {
        self.send_ack(self.http.post(self.url("/api/logout"))).await
    }

    async fn list_tickets(&self) -> ApiResult<Vec<Ticket>> {
        self.send(self.http.get(self.url("/api/feedback"))).await
    }

    async fn ticket_detail(&self, ticket_id: TicketId) -> ApiResult<Ticket> {
        self.send(self.http.get(self.url(&format!("/api/feedback/{ticket_id}"))))
            .await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> ApiResult<()> {
        self.send_ack(self.http.post(self.url("/api/feedback")).json(ticket))
            .await
    }

    async fn update_ticket(&self, ticket_id: TicketId, update: &TicketUpdate) -> ApiResult<()> {
        self.send_ack(
            self.http
                .put(self.url(&format!("/api/feedback/{ticket_id}")))
                .json(update),
        )
        .await
    }

    async fn post_comment(&self, ticket_id: TicketId, comment: &NewComment) -> ApiResult<()> {
        self.send_ack(
            self.http
                .post(self.url(&format!("/api/feedback/{ticket_id}/comments")))
                .json(comment),
        )
        .await
    }

    async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.send(self.http.get(self.url("/api/stats"))).await
    }

    async fn faculty_stats(&self) -> ApiResult<Vec<FacultyProfile>> {
        self.send(self.http.get(self.url("/api/faculty-stats"))).await
    }

    async fn list_faculty(&self) -> ApiResult<Vec<FacultyMember>> {
        self.send(self.http.get(self.url("/api/users/faculty"))).await
    }

    async fn add_faculty(&self, faculty: &NewFaculty) -> ApiResult<()> {
        self.send_ack(self.http.post(self.url("/api/users/add-faculty")).json(faculty))
            .await
    }

    async fn delete_faculty(&self, user_id: UserId) -> ApiResult<()> {
        self.send_ack(self.http.delete(self.url(&format!("/api/users/{user_id}"))))
            .await
    }

    async fn assigned_tasks(&self) -> ApiResult<Vec<Ticket>> {
        self.send(self.http.get(self.url("/api/faculty/tasks"))).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
