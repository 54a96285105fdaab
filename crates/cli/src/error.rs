use thiserror::Error;

pub type Result<T> = std::result::Result<T, TetherError>;

#[derive(Debug, Error)]
pub enum TetherError {
    /// Bearer credential absent or blank; rejected before any other component
    /// is invoked.
    #[error("broker credential is not set: export TETHER_TOKEN=<token>")]
    MissingCredential,

    /// A local adb invocation exited non-zero.
    #[error("{command} failed with {status}: {stderr}")]
    Adb {
        command: String,
        status: String,
        stderr: String,
    },

    /// No session record has been persisted by a prior `connect`.
    #[error("no stored session: run `tether connect` first")]
    NoSession,

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
