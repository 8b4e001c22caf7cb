//! Sample-report request form: form-backend POST with a mail-client fallback.
//!
//! A failed POST is never surfaced as an error. The visitor either gets the
//! normal confirmation or a pre-filled mail draft to send themselves.

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Request, header::ACCEPT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{config::PulseConfig, i18n::Lang};

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("Lead submission failed: {0}")]
    SubmissionFailed(String),
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fields as entered by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    pub clinic: String,
    pub website: String,
    pub area: String,
    pub email: String,
    pub notes: String,
}

/// What is sent to the form backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPayload {
    pub clinic: String,
    pub website: String,
    pub area: String,
    pub email: String,
    pub notes: String,
    pub lang: Lang,
    /// RFC 3339 with milliseconds, UTC
    pub ts: String,
}

impl LeadPayload {
    pub fn new(form: LeadForm, lang: Lang, timestamp: DateTime<Utc>) -> Self {
        Self {
            clinic: form.clinic,
            website: form.website,
            area: form.area,
            email: form.email,
            notes: form.notes,
            lang,
            ts: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Delivers a payload to a form endpoint.
pub trait LeadTransport {
    fn post(
        &self,
        endpoint: &str,
        payload: &LeadPayload,
    ) -> impl Future<Output = Result<(), LeadError>> + Send;
}

/// Form-encoded POST, the format Formspree-style backends accept.
#[derive(Debug, Clone, Default)]
pub struct FormspreeTransport {
    client: Client,
}

impl FormspreeTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn request(&self, endpoint: &str, payload: &LeadPayload) -> Result<Request, LeadError> {
        Ok(self
            .client
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .form(payload)
            .build()?)
    }
}

impl LeadTransport for FormspreeTransport {
    async fn post(&self, endpoint: &str, payload: &LeadPayload) -> Result<(), LeadError> {
        let request = self.request(endpoint, payload)?;
        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LeadError::SubmissionFailed(format!("{endpoint} answered {status}")))
        }
    }
}

/// A pre-filled message for the visitor's own mail client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn from_payload(to: &str, payload: &LeadPayload) -> Self {
        let body = [
            format!("Clinic: {}", payload.clinic),
            format!("Website: {}", payload.website),
            format!("Area: {}", payload.area),
            format!("Email: {}", payload.email),
            format!("Notes: {}", payload.notes),
        ]
        .join("\n");
        Self {
            to: to.to_owned(),
            subject: payload.lang.strings().mail_subject.to_owned(),
            body,
        }
    }

    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.to,
            encode_component(&self.subject),
            encode_component(&self.body)
        )
    }
}

/// Percent-encode like `encodeURIComponent`, which leaves `!'()*` as is.
fn encode_component(text: &str) -> String {
    [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")]
        .into_iter()
        .fold(urlencoding::encode(text).into_owned(), |encoded, (escaped, raw)| {
            encoded.replace(escaped, raw)
        })
}

/// Text for the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub title: &'static str,
    pub body: &'static str,
}

impl Confirmation {
    fn new(title: &'static str, lang: Lang) -> Self {
        Self {
            title,
            body: lang.strings().modal_body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadOutcome {
    /// The form backend accepted the request.
    Submitted(Confirmation),
    /// No backend or it failed; the visitor's mail client takes over.
    MailFallback {
        confirmation: Confirmation,
        draft: MailDraft,
    },
    /// Nowhere to send to; the visitor still gets a thank-you.
    Acknowledged(Confirmation),
}

impl LeadOutcome {
    pub const fn confirmation(&self) -> Confirmation {
        match self {
            Self::Submitted(c) | Self::Acknowledged(c) => *c,
            Self::MailFallback { confirmation, .. } => *confirmation,
        }
    }
}

pub struct LeadSubmitter<T: LeadTransport> {
    transport: T,
    endpoint: Option<String>,
    mailto: Option<String>,
}

impl LeadSubmitter<FormspreeTransport> {
    pub fn from_config(config: &PulseConfig) -> Result<Self, LeadError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::new(
            FormspreeTransport::new(client),
            config.form_endpoint.clone(),
            config.mailto.clone(),
        ))
    }
}

impl<T: LeadTransport> LeadSubmitter<T> {
    pub fn new(transport: T, endpoint: Option<String>, mailto: Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            transport,
            endpoint: non_empty(endpoint),
            mailto: non_empty(mailto),
        }
    }

    pub async fn submit(&self, form: LeadForm, lang: Lang) -> LeadOutcome {
        self.submit_at(form, lang, Utc::now()).await
    }

    /// Submit with an explicit timestamp.
    #[instrument(name = "Submit lead", skip(self, form), level = "info")]
    pub async fn submit_at(&self, form: LeadForm, lang: Lang, timestamp: DateTime<Utc>) -> LeadOutcome {
        let strings = lang.strings();
        let payload = LeadPayload::new(form, lang, timestamp);

        if let Some(endpoint) = &self.endpoint {
            match self.transport.post(endpoint, &payload).await {
                Ok(()) => {
                    info!(%endpoint, "Lead submitted");
                    return LeadOutcome::Submitted(Confirmation::new(strings.form_alert, lang));
                }
                Err(e) => warn!(error = %e, "Lead submission failed, falling back to mail"),
            }
        }

        match &self.mailto {
            Some(to) => LeadOutcome::MailFallback {
                confirmation: Confirmation::new(strings.mail_fallback_notice, lang),
                draft: MailDraft::from_payload(to, &payload),
            },
            None => {
                warn!("No form endpoint or mail recipient configured");
                LeadOutcome::Acknowledged(Confirmation::new(strings.form_alert, lang))
            }
        }
    }
}

/// Notes prefill used by the call-to-action buttons; only fills an empty field.
pub fn prefill_notes(current: &str, lang: Lang) -> Option<&'static str> {
    current
        .trim()
        .is_empty()
        .then(|| lang.strings().cta_prefill)
}
