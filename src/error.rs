//! Error types for gridload

use thiserror::Error;

/// Result type alias for gridload operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Main error type for all import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// A record field could not be turned into a cell value
    #[error("Failed to extract field{}: {message}", field_label(.field))]
    Extraction {
        field: Option<String>,
        message: String,
    },

    /// The grid rejected an append, resize or write
    #[error("Grid mutation rejected on sheet '{sheet}': {reason}")]
    GridMutation { sheet: String, reason: String },

    /// Target range is malformed or lies outside the sheet
    #[error("Invalid target range {range}: {reason}")]
    InvalidRange { range: String, reason: String },

    /// Sheet name violates the naming rules
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// A sheet with the same name is already registered
    #[error("Sheet '{0}' already exists")]
    DuplicateSheet(String),

    /// Sheet index does not exist
    #[error("Sheet index {index} out of range ({count} sheets)")]
    SheetIndexOutOfRange { index: usize, count: usize },

    /// Error occurred while loading a batch of records
    #[error("Failed to load records at row {row} into sheet '{sheet}': {source}")]
    LoadFailed {
        row: u32,
        sheet: String,
        #[source]
        source: Box<ImportError>,
    },
}

fn field_label(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(" '{}'", name),
        None => String::new(),
    }
}

impl ImportError {
    /// Extraction failure without a field name
    pub fn extraction(message: impl Into<String>) -> Self {
        ImportError::Extraction {
            field: None,
            message: message.into(),
        }
    }

    /// Extraction failure for a named field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::Extraction {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Grid mutation failure on a sheet
    pub fn grid(sheet: &str, reason: impl Into<String>) -> Self {
        ImportError::GridMutation {
            sheet: sheet.to_string(),
            reason: reason.into(),
        }
    }

    /// Strip `LoadFailed` wrappers and return the underlying error
    pub fn root_cause(&self) -> &ImportError {
        match self {
            ImportError::LoadFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
