/// Result type returned by the fallible operations of this crate.
pub type DdsResult<T> = Result<T, DdsError>;

/// Return codes of the DDS operations.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DdsError {
    /// A status kind or entity kind was used on an entity that does not support it.
    BadParameter,
    /// A precondition for the operation was not met.
    PreconditionNotMet(String),
    /// The entity has been deleted or is being deleted.
    AlreadyDeleted,
    /// The operation timed out.
    Timeout,
    /// The operation was called from a context where it is not allowed, e.g. from inside
    /// the listener which is currently being dispatched on the same entity.
    IllegalOperation,
}

impl core::fmt::Display for DdsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DdsError::BadParameter => write!(f, "Bad parameter"),
            DdsError::PreconditionNotMet(msg) => write!(f, "Precondition not met: {msg}"),
            DdsError::AlreadyDeleted => write!(f, "Already deleted"),
            DdsError::Timeout => write!(f, "Timeout"),
            DdsError::IllegalOperation => write!(f, "Illegal operation"),
        }
    }
}

impl std::error::Error for DdsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_their_return_code() {
        assert_eq!(DdsError::BadParameter.to_string(), "Bad parameter");
        assert_eq!(
            DdsError::PreconditionNotMet("Invalid table".to_string()).to_string(),
            "Precondition not met: Invalid table"
        );
        assert_eq!(DdsError::AlreadyDeleted.to_string(), "Already deleted");
        assert_eq!(DdsError::Timeout.to_string(), "Timeout");
        assert_eq!(DdsError::IllegalOperation.to_string(), "Illegal operation");
    }
}
