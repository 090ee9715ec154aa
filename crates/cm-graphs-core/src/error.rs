pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported chart type: {chart_type}")]
    UnsupportedChart { chart_type: String },

    #[error("invalid {chart} configuration: {message}")]
    InvalidConfig { chart: String, message: String },

    #[error("invalid data at {path}: {message}")]
    InvalidData { path: String, message: String },

    #[error("invalid color {value:?}")]
    InvalidColor { value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_data(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidData {
            path: path.into(),
            message: message.into(),
        }
    }
}
