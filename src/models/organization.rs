use serde::{Deserialize, Serialize};

/// A registered partner organization (NGO, clinic, distributor).
/// `location` is stored lowercased so it joins against request
/// locations without per-query folding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub location: String,
    pub kind: String,
}

impl Organization {
    pub fn new(name: &str, location: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            location: location.to_lowercase(),
            kind: kind.to_string(),
        }
    }
}
