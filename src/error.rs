use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// This enum contains all error messages this library can return. Most API functions will
/// generally return a [`Result<(), EndpointError>`].
///
/// [`Result<(), EndpointError>`]: std::result::Result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EndpointError {
    /// The compressed input stream read more bits than `num_bits` declared, or ran past
    /// `MAX_COMPRESSED_BITS`. The peer that sent this is either buggy or malicious.
    MalformedInputStream,
    /// The endpoint has not been bound to a peer identity yet (`Init` was never called).
    NotInitialized,
}

impl Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::MalformedInputStream => {
                write!(f, "Compressed input stream is malformed or truncated.")
            }
            EndpointError::NotInitialized => {
                write!(f, "The endpoint has not been bound to a peer identity yet.")
            }
        }
    }
}

impl Error for EndpointError {}
