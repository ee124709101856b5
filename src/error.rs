use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

/// HTTP status the platform uses to signal an expired or missing authorization.
pub const STATUS_UNAUTHORIZED: u16 = 401;
/// HTTP status the platform uses to signal throttling.
pub const STATUS_RATE_LIMITED: u16 = 503;

/// Discriminant of [`Error`], for callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Generic,
    Auth,
    RateLimit,
    InvalidParameterType,
}

#[derive(Error, Debug)]
pub enum Error {
    /// Catch-all: malformed payloads, undecodable tokens, unsupported methods.
    #[error("{message}")]
    Generic {
        message: String,
        status_code: Option<u16>,
    },
    /// Authentication was rejected or the client lacks the credentials for the call.
    #[error("{message}")]
    Auth {
        message: String,
        status_code: Option<u16>,
    },
    /// The platform is throttling this application.
    #[error("{message}")]
    RateLimit { message: String, status_code: u16 },
    /// A parameter value is neither text, number, boolean nor an upload.
    #[error("value for \"{key}\" was not parsable")]
    InvalidParameterType { key: String },
    /// Transport-level failure (connection, timeout, body read).
    #[error("request failed : {0}")]
    Request(#[from] reqwest::Error),
}

impl Error {
    /// Builds an error for an HTTP status, escalating 401 to [`Error::Auth`]
    /// and 503 to [`Error::RateLimit`].
    pub fn from_status<M: Into<String>>(message: M, status_code: u16) -> Self {
        let message = message.into();
        match status_code {
            STATUS_UNAUTHORIZED => Error::Auth {
                message,
                status_code: Some(status_code),
            },
            STATUS_RATE_LIMITED => Error::RateLimit {
                message,
                status_code,
            },
            _ => Error::Generic {
                message,
                status_code: Some(status_code),
            },
        }
    }

    pub fn generic<M: Into<String>>(message: M) -> Self {
        Error::Generic {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn auth<M: Into<String>>(message: M) -> Self {
        Error::Auth {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Generic { .. } | Error::Request(_) => ErrorKind::Generic,
            Error::Auth { .. } => ErrorKind::Auth,
            Error::RateLimit { .. } => ErrorKind::RateLimit,
            Error::InvalidParameterType { .. } => ErrorKind::InvalidParameterType,
        }
    }

    /// HTTP status that produced this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Generic { status_code, .. } | Error::Auth { status_code, .. } => *status_code,
            Error::RateLimit { status_code, .. } => Some(*status_code),
            Error::InvalidParameterType { .. } => None,
            Error::Request(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("Unable to decode {0} tokens.")]
    Empty(&'static str),
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}

impl From<TokenReaderError> for Error {
    fn from(err: TokenReaderError) -> Self {
        Error::generic(err.to_string())
    }
}
