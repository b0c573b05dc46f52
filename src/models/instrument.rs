use serde::{Deserialize, Serialize};
use std::fmt;

/// Tradeable security identifier, ticker plus venue suffix (e.g. `TCS.NS`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instrument {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Instrument {
    fn from(id: String) -> Self {
        Self(id)
    }
}
