use std::path::PathBuf;

use crate::geo::Coordinates;

/// Application-level constants
pub const APP_NAME: &str = "MediSetu";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// District coordination hub the admin dashboard measures distances
/// from (New Delhi district HQ). Override with MEDISETU_HQ_LAT/LNG.
const DEFAULT_HQ_LAT: f64 = 28.6139;
const DEFAULT_HQ_LNG: f64 = 77.2090;

/// Get the application data directory
/// ~/MediSetu/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MediSetu")
}

/// Path of the shared inventory database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("medisetu.db")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "info,medisetu=debug"
}

/// The admin hub coordinates, environment-overridable.
pub fn admin_hq() -> Coordinates {
    Coordinates {
        lat: env_f64("MEDISETU_HQ_LAT").unwrap_or(DEFAULT_HQ_LAT),
        lng: env_f64("MEDISETU_HQ_LNG").unwrap_or(DEFAULT_HQ_LNG),
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
