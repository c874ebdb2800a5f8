//! Validation constraints for string and numeric fields

/// Constraints for string validation
#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    /// Minimum length (in characters, not bytes)
    pub min_length: Option<usize>,
    /// Maximum length (in characters, not bytes)
    pub max_length: Option<usize>,
    /// Regex pattern (compiled at validation time)
    pub pattern: Option<String>,
}

impl StringConstraints {
    /// Constraints with a maximum length only
    pub fn max(max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
            ..Self::default()
        }
    }
}

/// Constraints for numeric validation (generic over i64 and f64)
#[derive(Debug, Clone, Default)]
pub struct NumericConstraints<T> {
    /// Minimum value (inclusive)
    pub minimum: Option<T>,
    /// Maximum value (inclusive)
    pub maximum: Option<T>,
}

impl<T> NumericConstraints<T> {
    /// Constraints with an inclusive range
    pub fn range(minimum: T, maximum: T) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_constraints_default() {
        let constraints = StringConstraints::default();
        assert!(constraints.min_length.is_none());
        assert!(constraints.max_length.is_none());
        assert!(constraints.pattern.is_none());
    }

    #[test]
    fn test_string_constraints_max() {
        let constraints = StringConstraints::max(16);
        assert_eq!(constraints.max_length, Some(16));
        assert!(constraints.min_length.is_none());
    }

    #[test]
    fn test_numeric_constraints_range() {
        let constraints = NumericConstraints::range(0i64, 10i64);
        assert_eq!(constraints.minimum, Some(0));
        assert_eq!(constraints.maximum, Some(10));
    }
}
