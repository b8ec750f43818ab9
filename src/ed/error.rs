use thiserror::Error;

/// Every way a command can fail.
///
/// The display strings are what verbose mode shows after the `?` marker.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EdError {
    #[error("empty buffer")]
    EmptyBuffer,

    #[error("invalid address")]
    InvalidAddress,

    #[error("invalid address range")]
    InvalidRange,

    #[error("no match")]
    NoMatch,

    #[error("invalid regex")]
    InvalidRegex,

    #[error("invalid regex in address")]
    InvalidAddressRegex,

    #[error("invalid substitute command")]
    InvalidSubstitute,

    #[error("unknown command")]
    UnknownCommand,
}
