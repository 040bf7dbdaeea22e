use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DiffError {
    /// A fuzzy record was constructed from something that is not a record.
    NotARecord { found: &'static str },
    /// Tolerance must be finite and non-negative.
    InvalidTolerance(f64),
    /// Input nesting exceeded the recursion limit.
    DepthExceeded { limit: usize },
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotARecord { found } => {
                write!(f, "expected a record, found {found}")
            }
            Self::InvalidTolerance(t) => {
                write!(f, "tolerance must be finite and non-negative, got {t}")
            }
            Self::DepthExceeded { limit } => {
                write!(f, "record nesting exceeds the depth limit of {limit}")
            }
        }
    }
}

impl std::error::Error for DiffError {}
