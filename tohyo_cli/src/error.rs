use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Tohyo(#[from] tohyo::Error),

    #[error("{0}")]
    Election(#[from] tohyo::ElectionError),

    #[error("no caller address: pass --from or set TOHYO_ACCOUNT")]
    MissingAccount,

    #[error("an election already exists at {0}")]
    AlreadyDeployed(String),

    #[error("invalid {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn invalid(name: &'static str, value: &str) -> Self {
        CliError::InvalidArgument {
            name,
            value: value.to_owned(),
        }
    }
}
