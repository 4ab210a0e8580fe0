//! Error type shared by every polygon editing operation.

use std::fmt;

/// Failure of an editor operation.
///
/// Everything except [`EditorError::MalformedInput`] is recovered locally: the
/// operation becomes a no-op and the caller may surface a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Removing a point would leave a closed polygon with fewer than 3 points
    MinimumPoints { count: usize },
    /// A point index outside the polygon's point list
    IndexOutOfRange { index: usize, len: usize },
    /// A coordinate was NaN or infinite
    NonFiniteCoordinate,
    /// The operation needs a selected polygon
    NoSelection,
    /// The operation is not available in the current mode
    WrongMode,
    /// A fixed-capacity handle pool has no free slot
    PoolExhausted,
    /// Persisted data could not be parsed
    MalformedInput(String),
}

impl EditorError {
    /// Validation failures leave state untouched and are not worth more than a warning.
    pub fn is_validation(&self) -> bool {
        !matches!(self, EditorError::PoolExhausted | EditorError::MalformedInput(_))
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::MinimumPoints { count } => {
                write!(f, "a closed polygon needs at least 3 points (has {})", count)
            }
            EditorError::IndexOutOfRange { index, len } => {
                write!(f, "point index {} out of range for {} points", index, len)
            }
            EditorError::NonFiniteCoordinate => write!(f, "coordinate is not a finite number"),
            EditorError::NoSelection => write!(f, "no polygon is selected"),
            EditorError::WrongMode => write!(f, "operation not available in the current mode"),
            EditorError::PoolExhausted => write!(f, "drawable handle pool is exhausted"),
            EditorError::MalformedInput(reason) => write!(f, "malformed input: {}", reason),
        }
    }
}

impl std::error::Error for EditorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(EditorError::MinimumPoints { count: 3 }.is_validation());
        assert!(EditorError::NonFiniteCoordinate.is_validation());
        assert!(!EditorError::PoolExhausted.is_validation());
        assert!(!EditorError::MalformedInput("x".into()).is_validation());
    }

    #[test]
    fn test_display_mentions_counts() {
        let msg = EditorError::IndexOutOfRange { index: 7, len: 3 }.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }
}
