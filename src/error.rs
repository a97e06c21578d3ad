use std::fmt;

/// Broad classification used by the CLI to pick a message prefix and exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Anything that went wrong reaching or talking to the SELECT API
    Transport,
    /// Everything else (bad records, templates, file system, ...)
    Unexpected,
}

/// Error types for usage group generation
#[derive(Debug)]
pub enum GenerateError {
    /// The request could not be sent or the response could not be read
    Transport { url: String, message: String },

    /// The API answered with a non-success status
    ApiStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// A record returned by the API is missing required data
    InvalidRecord {
        record_type: &'static str,
        id: Option<String>,
        message: String,
    },

    /// Invalid settings (base URL, settings file, ...)
    Config(String),

    /// Document template failed to compile or render
    Template(String),

    /// File system operation failed
    FileSystem(String),

    /// JSON (de)serialization error
    Serialization(String),
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::Transport { .. } | GenerateError::ApiStatus { .. } => {
                ErrorKind::Transport
            }
            _ => ErrorKind::Unexpected,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Transport { url, message } => {
                write!(f, "Request to {} failed: {}", url, message)
            }
            GenerateError::ApiStatus { url, status, body } => {
                write!(f, "API returned status {} for {}", status, url)?;

                if !body.is_empty() {
                    write!(f, ": {}", body)?;
                }

                Ok(())
            }
            GenerateError::InvalidRecord {
                record_type,
                id,
                message,
            } => {
                write!(f, "Invalid {} record", record_type)?;

                if let Some(id) = id {
                    write!(f, " '{}'", id)?;
                }

                write!(f, ": {}", message)
            }
            GenerateError::Config(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            GenerateError::Template(msg) => {
                write!(f, "Template error: {}", msg)
            }
            GenerateError::FileSystem(msg) => {
                write!(f, "File system error: {}", msg)
            }
            GenerateError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<serde_json::Error> for GenerateError {
    fn from(err: serde_json::Error) -> Self {
        GenerateError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for GenerateError {
    fn from(err: serde_yaml::Error) -> Self {
        GenerateError::Config(err.to_string())
    }
}

impl From<handlebars::TemplateError> for GenerateError {
    fn from(err: handlebars::TemplateError) -> Self {
        GenerateError::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for GenerateError {
    fn from(err: handlebars::RenderError) -> Self {
        GenerateError::Template(err.to_string())
    }
}

impl From<anyhow::Error> for GenerateError {
    fn from(err: anyhow::Error) -> Self {
        GenerateError::FileSystem(format!("{:#}", err))
    }
}

/// Result type for generation operations
pub type GenerateResult<T> = Result<T, GenerateError>;
