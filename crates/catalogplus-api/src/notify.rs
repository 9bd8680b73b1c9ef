//! Operator alerts for failed requests

use std::sync::Arc;

use async_trait::async_trait;
use catalogplus_core::{MailError, Mailer, RequestError};
use tracing::{debug, error, warn};

/// Status codes that trigger an alert
pub const NOTIFY_CODES: [u16; 3] = [400, 500, 503];

/// Sends one alert per qualifying request error
pub struct ErrorNotifier {
    service_name: String,
    mailer: Option<Arc<dyn Mailer>>,
}

impl ErrorNotifier {
    pub fn new(service_name: impl Into<String>, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self {
            service_name: service_name.into(),
            mailer,
        }
    }

    pub fn should_notify(code: u16) -> bool {
        NOTIFY_CODES.contains(&code)
    }

    pub fn subject(&self, tag: &str, code: u16) -> String {
        format!("[{}] Exception: {} ({})", self.service_name, code, tag)
    }

    /// Mail `request_error` if its code qualifies. Failures are only logged.
    pub async fn notify(&self, tag: &str, request_error: &RequestError) {
        if !Self::should_notify(request_error.code) {
            return;
        }

        let Some(mailer) = &self.mailer else {
            debug!(code = request_error.code, "No mailer configured, alert dropped");
            return;
        };

        let subject = self.subject(tag, request_error.code);
        if let Err(e) = mailer.send(&subject, &request_error.description).await {
            error!(error = %e, subject = %subject, "Failed to send alert mail");
        }
    }
}

/// Mailer that writes alerts to the log instead of an SMTP relay
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), MailError> {
        warn!(subject = %subject, body = %body, "Alert");
        Ok(())
    }
}
