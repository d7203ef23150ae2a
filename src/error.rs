use thiserror::Error;

pub type Result<T> = std::result::Result<T, RiskError>;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("{field} value {value} is outside the normalized range [0, 1]")]
    OutOfRange { field: String, value: f64 },
    #[error("unknown indicator field '{0}'")]
    UnknownField(String),
    #[error("pagination start item must be 1 or greater, got {0}")]
    InvalidCursor(usize),
    #[error("no region found for id '{0}'")]
    RegionNotFound(String),
    #[error("feature service error: {0}")]
    Transport(String),
    #[error("unsupported file type '{0}': please upload a shapefile in .zip format")]
    UnsupportedUpload(String),
    #[error("malformed feature collection: {0}")]
    MalformedUpload(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl RiskError {
    /// Malformed or out-of-range caller input, as opposed to missing data
    /// or a failure in the query transport.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RiskError::OutOfRange { .. } | RiskError::UnknownField(_) | RiskError::InvalidCursor(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_kinds() {
        let e = RiskError::OutOfRange { field: "Risk".into(), value: 1.5 };
        assert!(e.is_validation());
        assert!(RiskError::InvalidCursor(0).is_validation());
        assert!(!RiskError::RegionNotFound("7".into()).is_validation());
        assert!(!RiskError::Transport("timeout".into()).is_validation());
    }

    #[test]
    fn transport_message_is_kept() {
        let e = RiskError::Transport("503 Service Unavailable".into());
        assert!(e.to_string().contains("503 Service Unavailable"));
    }
}
