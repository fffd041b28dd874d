use thiserror::Error;

/// Errors raised while building a [`crate::SubscriptionMap`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// The supplied pattern set exceeded the configured maximum.
    #[error("pattern set has {found} entries, exceeding the configured maximum of {max}")]
    TooManyPatterns {
        /// Number of patterns supplied.
        found: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A pattern string was empty, which can never match anything.
    #[error("pattern at index {0} is empty")]
    EmptyPattern(usize),
}
