use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("File {file} does not have the expected columns: {}", expected.join(", "))]
    SchemaMismatch { file: String, expected: Vec<String> },

    #[error("Invalid vendor mapping: {0}")]
    MappingParse(String),

    #[error("No input files given")]
    NoFiles,

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RemitError>;
