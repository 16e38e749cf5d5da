#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Failed to read input {0}")]
    Io(String),

    #[error("Input is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("{0}")]
    UnknownDialect(String),
}
