//! Errors reported by session sources.

use thiserror::Error;

use crate::session::Session;

/// Error returned by a [`SessionSource`](crate::SessionSource).
///
/// `NoCookie` and `Decode` still carry a fresh session: the request had no
/// usable session state, but the source could start a new one. Binders treat
/// them as success and bind the carried session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The request carried no session cookie.
    #[error("no session cookie present")]
    NoCookie { session: Box<Session> },

    /// The session cookie was present but could not be decoded.
    #[error("session cookie could not be decoded: {message}")]
    Decode {
        message: String,
        session: Box<Session>,
    },

    /// The source failed to produce a session.
    #[error("session source error: {0}")]
    Source(String),

    /// The backing store rejected the operation.
    #[error("session store error: {0}")]
    Store(String),

    /// The source is temporarily unable to serve sessions.
    #[error("session source unavailable: {0}")]
    Unavailable(String),
}

impl SessionError {
    /// Whether the source still produced a usable fresh session.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoCookie { .. } | Self::Decode { .. })
    }

    /// Take the fresh session out of a recoverable error, or hand the error back.
    pub fn into_fresh_session(self) -> Result<Session, SessionError> {
        match self {
            Self::NoCookie { session } | Self::Decode { session, .. } => Ok(*session),
            other => Err(other),
        }
    }

    /// Get HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unavailable(_) => 503,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors_yield_session() {
        let err = SessionError::NoCookie {
            session: Box::new(Session::new("s")),
        };
        assert!(err.is_recoverable());
        let session = err.into_fresh_session().unwrap();
        assert_eq!(session.name(), "s");
        assert!(session.is_new());

        let err = SessionError::Decode {
            message: "bad base64".into(),
            session: Box::new(Session::new("t")),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "session cookie could not be decoded: bad base64");
        assert_eq!(err.into_fresh_session().unwrap().name(), "t");
    }

    #[test]
    fn test_other_errors_are_returned() {
        let err = SessionError::Store("disk full".into());
        assert!(!err.is_recoverable());
        let back = err.into_fresh_session().unwrap_err();
        assert!(matches!(back, SessionError::Store(ref m) if m == "disk full"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SessionError::Source("x".into()).status_code(), 500);
        assert_eq!(SessionError::Store("x".into()).status_code(), 500);
        assert_eq!(SessionError::Unavailable("x".into()).status_code(), 503);
    }
}
