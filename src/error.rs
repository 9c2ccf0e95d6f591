use std::error::Error as StdError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A conversion parameter is out of range or inconsistent with another one.
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
    /// The counter was used after [`Counter::teardown`](crate::counter::Counter::teardown).
    UseAfterTeardown,
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{name}`: {reason}")
            }
            Error::UseAfterTeardown => f.write_str("counter used after teardown"),
        }
    }
}

impl StdError for Error {}
