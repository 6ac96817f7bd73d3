use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocError {
    #[error("No sheet matching keywords {keywords:?} in workbook '{workbook}'")]
    MissingSource {
        workbook: String,
        keywords: Vec<String>,
    },

    #[error("Required column '{column}' not found in sheet '{sheet}'")]
    MissingColumn { column: String, sheet: String },

    #[error("Workbook not found or not a directory: {0}")]
    WorkbookNotFound(String),

    #[error("Invalid report window: {0}")]
    InvalidWindow(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AllocError {
    fn from(e: serde_json::Error) -> Self {
        AllocError::Serialization(e.to_string())
    }
}
