//! Transactional email client implementing the invitation mailer port
//!
//! Speaks a Brevo-style API: `POST {api_url}/v3/smtp/email` with an
//! `api-key` header and a JSON payload. Delivery is one attempt with a
//! timeout; the invitation service treats failures as degraded success.

use std::time::Duration;

use async_trait::async_trait;
use clinica_core::invitations::ports::InvitationMailer;
use clinica_domain::{ClinicaError, EmailConfig, Invitation, Result};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info};

use crate::http::HttpClient;

/// Configuration for the mailer client
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Base URL of the provider API
    pub api_url: String,
    /// Provider API key, sent as the `api-key` header
    pub api_key: String,
    /// Sender address
    pub sender_email: String,
    /// Optional sender display name
    pub sender_name: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl MailerConfig {
    /// Build a mailer config from the application email section.
    pub fn from_email_config(config: &EmailConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    html_content: String,
}

/// HTTP mailer implementing [`InvitationMailer`]
pub struct MailerClient {
    http: HttpClient,
    config: MailerConfig,
}

impl MailerClient {
    /// Create a new mailer client.
    pub fn new(config: MailerConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/smtp/email", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl InvitationMailer for MailerClient {
    async fn send_invitation(
        &self,
        invitation: &Invitation,
        practice_name: &str,
        accept_link: &str,
    ) -> Result<()> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.config.sender_email.clone(),
                name: self.config.sender_name.clone(),
            },
            to: vec![EmailAddress { email: invitation.email.clone(), name: None }],
            subject: format!("You've been invited to join {practice_name}"),
            html_content: invitation_html(invitation, practice_name, accept_link),
        };

        debug!(invitation_id = %invitation.id, "sending invitation email");
        let request = self
            .http
            .request(Method::POST, self.endpoint())
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&body);
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClinicaError::Upstream(format!(
                "email provider returned {status}: {detail}"
            )));
        }

        info!(invitation_id = %invitation.id, to = %invitation.email, "invitation email sent");
        Ok(())
    }
}

fn invitation_html(invitation: &Invitation, practice_name: &str, accept_link: &str) -> String {
    format!(
        "<p>You have been invited to join <strong>{practice_name}</strong> as \
         {role}.</p>\
         <p><a href=\"{accept_link}\">Accept the invitation</a></p>\
         <p>The link expires in 7 days.</p>",
        role = invitation.role.as_str(),
    )
}
