//! Cold-chain telemetry — periodic temperature readings from the
//! cloud IoT gateway a fridge sensor reports into.
//!
//! The device token is deployment configuration, never a literal in
//! code. Polling is fire-and-forget: a failed read is logged and the
//! previous reading kept, so the dashboard shows the last known
//! temperature rather than flickering empty.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::models::enums::TempStatus;

/// Poll interval for the live temperature readout.
const POLL_INTERVAL_SECS: u64 = 5;

/// Sleep granularity for shutdown responsiveness (1 second).
const SLEEP_GRANULARITY_SECS: u64 = 1;

/// Cold-chain band in °C: readings outside 2–8 are unsafe.
const COLD_CHAIN_MIN_C: f64 = 2.0;
const COLD_CHAIN_MAX_C: f64 = 8.0;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Telemetry configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("Cannot reach telemetry gateway at {0}")]
    Connection(String),

    #[error("Telemetry request failed: {0}")]
    HttpClient(String),

    #[error("Telemetry gateway returned HTTP {status}: {body}")]
    Gateway { status: u16, body: String },

    #[error("Unreadable temperature value: {0:?}")]
    Parse(String),
}

/// Gateway endpoint and credentials, resolved from the environment.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub base_url: String,
    pub token: String,
    pub pin: String,
}

impl TelemetryConfig {
    /// Read MEDISETU_TELEMETRY_URL / _TOKEN / _PIN. The token has no
    /// default; a deployment without one cannot poll.
    pub fn from_env() -> Result<Self, TelemetryError> {
        let base_url = std::env::var("MEDISETU_TELEMETRY_URL")
            .unwrap_or_else(|_| "https://blynk.cloud".to_string());
        let token = std::env::var("MEDISETU_TELEMETRY_TOKEN")
            .map_err(|_| TelemetryError::MissingConfig("MEDISETU_TELEMETRY_TOKEN"))?;
        let pin = std::env::var("MEDISETU_TELEMETRY_PIN").unwrap_or_else(|_| "V0".to_string());
        Ok(Self { base_url, token, pin })
    }
}

/// One temperature reading, classified against the cold-chain band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempReading {
    pub celsius: f64,
    pub status: TempStatus,
}

impl TempReading {
    pub fn classify(celsius: f64) -> Self {
        let status = if (COLD_CHAIN_MIN_C..=COLD_CHAIN_MAX_C).contains(&celsius) {
            TempStatus::Safe
        } else {
            TempStatus::Unsafe
        };
        Self { celsius, status }
    }
}

/// HTTP client for the telemetry gateway.
pub struct TelemetryClient {
    config: TelemetryConfig,
    client: reqwest::blocking::Client,
}

impl TelemetryClient {
    pub fn new(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(4))
            .build()
            .map_err(|e| TelemetryError::HttpClient(e.to_string()))?;
        Ok(Self {
            config: TelemetryConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            client,
        })
    }

    pub fn from_env() -> Result<Self, TelemetryError> {
        Self::new(TelemetryConfig::from_env()?)
    }

    /// Read the current temperature from the gateway.
    pub fn read_temperature(&self) -> Result<TempReading, TelemetryError> {
        let url = format!("{}/external/api/get", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("token", self.config.token.as_str()), ("pin", self.config.pin.as_str())])
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    TelemetryError::Connection(self.config.base_url.clone())
                } else {
                    TelemetryError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TelemetryError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| TelemetryError::HttpClient(e.to_string()))?;
        parse_reading(&body)
    }
}

/// The gateway answers with a bare number as plain text.
fn parse_reading(body: &str) -> Result<TempReading, TelemetryError> {
    let celsius: f64 = body
        .trim()
        .parse()
        .map_err(|_| TelemetryError::Parse(body.trim().to_string()))?;
    Ok(TempReading::classify(celsius))
}

/// Background poller holding the latest reading.
///
/// Dropping the monitor shuts the poll thread down and joins it.
pub struct TelemetryMonitor {
    latest: Arc<Mutex<Option<TempReading>>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl TelemetryMonitor {
    /// Start polling on a background thread.
    pub fn start(client: TelemetryClient) -> Self {
        let latest = Arc::new(Mutex::new(None));
        let shutdown = Arc::new(AtomicBool::new(false));

        let latest_writer = latest.clone();
        let flag = shutdown.clone();
        let handle = std::thread::spawn(move || {
            tracing::info!("Telemetry poller started (every {POLL_INTERVAL_SECS}s)");
            poll_loop(&client, &latest_writer, &flag);
        });

        Self {
            latest,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Latest reading, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<TempReading> {
        self.latest.lock().ok()?.as_ref().copied()
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for TelemetryMonitor {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

fn poll_loop(
    client: &TelemetryClient,
    latest: &Mutex<Option<TempReading>>,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match client.read_temperature() {
            Ok(reading) => {
                if reading.status == TempStatus::Unsafe {
                    tracing::warn!(celsius = reading.celsius, "cold-chain band exceeded");
                }
                if let Ok(mut slot) = latest.lock() {
                    *slot = Some(reading);
                }
            }
            // Keep the previous reading; the poll cadence retries anyway.
            Err(e) => tracing::warn!(error = %e, "telemetry poll failed"),
        }

        for _ in 0..(POLL_INTERVAL_SECS / SLEEP_GRANULARITY_SECS) {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!("Telemetry poller shutting down");
                return;
            }
            std::thread::sleep(Duration::from_secs(SLEEP_GRANULARITY_SECS));
        }
    }
    tracing::info!("Telemetry poller shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_inside_band_are_safe() {
        assert_eq!(TempReading::classify(2.0).status, TempStatus::Safe);
        assert_eq!(TempReading::classify(5.5).status, TempStatus::Safe);
        assert_eq!(TempReading::classify(8.0).status, TempStatus::Safe);
    }

    #[test]
    fn readings_outside_band_are_unsafe() {
        assert_eq!(TempReading::classify(1.9).status, TempStatus::Unsafe);
        assert_eq!(TempReading::classify(8.1).status, TempStatus::Unsafe);
        assert_eq!(TempReading::classify(-4.0).status, TempStatus::Unsafe);
    }

    #[test]
    fn parses_plain_text_reading() {
        let reading = parse_reading(" 6.4\n").unwrap();
        assert_eq!(reading.celsius, 6.4);
        assert_eq!(reading.status, TempStatus::Safe);
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        let err = parse_reading("offline").unwrap_err();
        assert!(matches!(err, TelemetryError::Parse(_)));
    }

    #[test]
    fn config_requires_a_token() {
        // Only assert when the variable is genuinely absent; CI may set it.
        if std::env::var("MEDISETU_TELEMETRY_TOKEN").is_err() {
            let err = TelemetryConfig::from_env().unwrap_err();
            assert!(matches!(err, TelemetryError::MissingConfig(_)));
        }
    }

    #[test]
    fn monitor_starts_empty_and_shuts_down() {
        let client = TelemetryClient::new(TelemetryConfig {
            base_url: "http://127.0.0.1:9".into(),
            token: "test-token".into(),
            pin: "V0".into(),
        })
        .unwrap();

        let monitor = TelemetryMonitor::start(client);
        assert!(monitor.latest().is_none());
        monitor.shutdown();
        // Drop joins the poll thread.
    }
}
