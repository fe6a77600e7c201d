use crate::engines::scheduling::status::RunStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetControlError {
    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    #[error("Unknown node '{node}' referenced by {context}")]
    UnknownNode { node: String, context: String },

    #[error("The graph has no target nodes")]
    EmptyTargets,

    #[error("Target node '{target}' cannot be reached within {maximum_path_length} steps")]
    UnreachableTarget { target: String, maximum_path_length: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: RunStatus, to: RunStatus },

    #[error("Corrupt checkpoint: {0}")]
    CorruptCheckpoint(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl NetControlError {
    /// True for errors caused by the submitted graph or parameters rather than
    /// by the environment. These are reported to the submitter and never
    /// retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NetControlError::DuplicateNode(_)
                | NetControlError::UnknownNode { .. }
                | NetControlError::EmptyTargets
                | NetControlError::UnreachableTarget { .. }
                | NetControlError::Configuration(_)
                | NetControlError::CorruptCheckpoint(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NetControlError>;
