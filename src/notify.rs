//! Expiry alert dispatch through the transactional e-mail provider.
//!
//! Provider credentials come from the environment. Dispatch stays
//! fire-and-forget at the policy level — callers may ignore the
//! outcome — but every call returns a typed result and logs, so
//! nothing fails invisibly.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::models::InventoryRecord;

/// Records expiring within this many days trigger the alert e-mail.
pub const EXPIRY_ALERT_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("Cannot reach e-mail provider at {0}")]
    Connection(String),

    #[error("E-mail request failed: {0}")]
    HttpClient(String),

    #[error("E-mail provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Provider endpoint and credentials, resolved from the environment.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub base_url: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl NotifyConfig {
    /// Read MEDISETU_EMAIL_URL / _SERVICE_ID / _TEMPLATE_ID /
    /// _PUBLIC_KEY. Credentials have no defaults.
    pub fn from_env() -> Result<Self, NotifyError> {
        let base_url = std::env::var("MEDISETU_EMAIL_URL")
            .unwrap_or_else(|_| "https://api.emailjs.com".to_string());
        let service_id = std::env::var("MEDISETU_EMAIL_SERVICE_ID")
            .map_err(|_| NotifyError::MissingConfig("MEDISETU_EMAIL_SERVICE_ID"))?;
        let template_id = std::env::var("MEDISETU_EMAIL_TEMPLATE_ID")
            .map_err(|_| NotifyError::MissingConfig("MEDISETU_EMAIL_TEMPLATE_ID"))?;
        let public_key = std::env::var("MEDISETU_EMAIL_PUBLIC_KEY")
            .map_err(|_| NotifyError::MissingConfig("MEDISETU_EMAIL_PUBLIC_KEY"))?;
        Ok(Self {
            base_url,
            service_id,
            template_id,
            public_key,
        })
    }
}

/// One medicine nearing expiry, as listed in the alert e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryNotice {
    pub medicine: String,
    pub expiry_days: i64,
}

/// What happened to a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    /// Nothing to report; no e-mail was attempted.
    Skipped,
}

/// Select records within the alert window, soonest first.
pub fn expiring_within(records: &[InventoryRecord], days: i64) -> Vec<ExpiryNotice> {
    let mut notices: Vec<ExpiryNotice> = records
        .iter()
        .filter(|r| r.expiry_days <= days)
        .map(|r| ExpiryNotice {
            medicine: r.medicine.clone(),
            expiry_days: r.expiry_days,
        })
        .collect();
    notices.sort_by_key(|n| n.expiry_days);
    notices
}

/// "Insulin (expires in 5 days), MMR Vaccine (expires in 7 days)"
pub fn format_notice_list(notices: &[ExpiryNotice]) -> String {
    notices
        .iter()
        .map(|n| format!("{} (expires in {} days)", n.medicine, n.expiry_days))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Request body for the provider's send endpoint.
#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    to_name: &'a str,
    location: &'a str,
    medicines: &'a str,
    message: &'a str,
}

/// HTTP client for the e-mail provider.
pub struct EmailClient {
    config: NotifyConfig,
    client: reqwest::blocking::Client,
}

impl EmailClient {
    pub fn new(config: NotifyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::HttpClient(e.to_string()))?;
        Ok(Self {
            config: NotifyConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            client,
        })
    }

    pub fn from_env() -> Result<Self, NotifyError> {
        Self::new(NotifyConfig::from_env()?)
    }

    /// Send the critical-expiry alert. An empty notice list skips the
    /// dispatch entirely.
    pub fn send_expiry_alert(
        &self,
        recipient: &str,
        location: &str,
        notices: &[ExpiryNotice],
    ) -> Result<DispatchOutcome, NotifyError> {
        if notices.is_empty() {
            return Ok(DispatchOutcome::Skipped);
        }

        let medicines = format_notice_list(notices);
        self.send(
            recipient,
            location,
            &medicines,
            "Critical medicines nearing expiry detected",
        )?;
        tracing::info!(recipient, count = notices.len(), "expiry alert e-mail sent");
        Ok(DispatchOutcome::Sent)
    }

    /// Deliverability check with fixed content.
    pub fn send_test_email(&self) -> Result<(), NotifyError> {
        self.send(
            "Test User",
            "Test Location",
            "Test Medicine 1, Test Medicine 2",
            "This is a test alert from MediSetu.",
        )?;
        tracing::info!("test e-mail sent");
        Ok(())
    }

    fn send(
        &self,
        to_name: &str,
        location: &str,
        medicines: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        let url = format!("{}/api/v1.0/email/send", self.config.base_url);
        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: TemplateParams {
                to_name,
                location,
                medicines,
                message,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    NotifyError::Connection(self.config.base_url.clone())
                } else {
                    NotifyError::HttpClient(e.to_string())
                }
            })
            .inspect_err(|e| tracing::error!(error = %e, "e-mail dispatch failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = status.as_u16(), "e-mail provider rejected dispatch");
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::TemperatureRisk;

    fn record(medicine: &str, expiry_days: i64) -> InventoryRecord {
        InventoryRecord::new("Pharmacy A", medicine, 50, expiry_days, TemperatureRisk::Low)
    }

    fn test_client() -> EmailClient {
        EmailClient::new(NotifyConfig {
            base_url: "http://127.0.0.1:9".into(),
            service_id: "service".into(),
            template_id: "template".into(),
            public_key: "key".into(),
        })
        .unwrap()
    }

    #[test]
    fn selects_records_within_window_soonest_first() {
        let records = vec![record("A", 7), record("B", 45), record("C", -2), record("D", 5)];
        let notices = expiring_within(&records, EXPIRY_ALERT_DAYS);
        let names: Vec<&str> = notices.iter().map(|n| n.medicine.as_str()).collect();
        assert_eq!(names, vec!["C", "D", "A"]);
    }

    #[test]
    fn formats_the_medicine_list() {
        let notices = vec![
            ExpiryNotice { medicine: "Insulin".into(), expiry_days: 5 },
            ExpiryNotice { medicine: "MMR Vaccine".into(), expiry_days: 7 },
        ];
        assert_eq!(
            format_notice_list(&notices),
            "Insulin (expires in 5 days), MMR Vaccine (expires in 7 days)"
        );
    }

    #[test]
    fn empty_notice_list_skips_dispatch() {
        let outcome = test_client().send_expiry_alert("Admin", "Unknown", &[]).unwrap();
        assert_eq!(outcome, DispatchOutcome::Skipped);
    }

    #[test]
    fn unreachable_provider_is_a_typed_error() {
        let notices = vec![ExpiryNotice { medicine: "Insulin".into(), expiry_days: 3 }];
        let err = test_client()
            .send_expiry_alert("Admin", "Sector 21", &notices)
            .unwrap_err();
        assert!(matches!(err, NotifyError::Connection(_) | NotifyError::HttpClient(_)));
    }

    #[test]
    fn send_request_serializes_provider_shape() {
        let body = SendRequest {
            service_id: "svc",
            template_id: "tpl",
            user_id: "key",
            template_params: TemplateParams {
                to_name: "Admin",
                location: "Sector 21",
                medicines: "Insulin (expires in 3 days)",
                message: "Critical medicines nearing expiry detected",
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"service_id\":\"svc\""));
        assert!(json.contains("\"template_params\""));
        assert!(json.contains("\"to_name\":\"Admin\""));
    }

    #[test]
    fn config_requires_credentials() {
        if std::env::var("MEDISETU_EMAIL_SERVICE_ID").is_err() {
            let err = NotifyConfig::from_env().unwrap_err();
            assert!(matches!(err, NotifyError::MissingConfig(_)));
        }
    }
}
