use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A batch record carried a timestamp we cannot parse.
    /// Fatal for that batch: silently defaulting would break the
    /// exact-timestamp matching that downstream SCD2 loads depend on.
    #[error("Unparseable timestamp '{raw}' in {context}")]
    Timestamp { raw: String, context: String },

    #[error("Customer file '{path}' is missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GenResult<T> = Result<T, GenError>;
