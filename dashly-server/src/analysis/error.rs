//! Analysis error type
//!
//! Every failure the analysis core can surface. The HTTP boundary maps
//! these onto client/server error responses; nothing here is retried.

/// Errors raised by the analysis pipeline
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Unsupported file format: '{0}'. Use CSV or XLSX")]
    UnsupportedFormat(String),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Malformed CSV input: {0}")]
    Csv(String),

    #[error("Malformed spreadsheet input: {0}")]
    Spreadsheet(String),

    #[error("Unparseable date value: '{0}'. Check the data format")]
    DateParse(String),

    #[error("Period '{0}' is not supported by the analyzer")]
    UnsupportedPeriod(String),

    #[error("No data in the requested period")]
    NoData,

    #[error("Chart rendering failed: {0}")]
    Render(String),
}

impl AnalyzeError {
    /// Whether the error was caused by the client's input
    ///
    /// Render failures are the server's problem; everything else is a bad
    /// upload or a bad request parameter.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AnalyzeError::Render(_))
    }
}
