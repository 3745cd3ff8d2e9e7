use thiserror::Error;

/// Main error type for TimerFit
#[derive(Error, Debug)]
pub enum TfError {
    #[error("Invalid component set: {message}")]
    InvalidComponentSet { message: String },

    #[error("Invalid range: {message}")]
    InvalidRange { message: String },

    #[error("Degenerate circuit: {message}")]
    DegenerateCircuit { message: String },

    #[error("Index {index} out of range for {axis} (len {len})")]
    OutOfRangeIndex {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid target: {message}")]
    InvalidTarget { message: String },

    #[error("Invalid component value: {message}")]
    InvalidComponentValue { message: String },

    #[error("Invalid error weights: {message}")]
    InvalidWeights { message: String },

    #[error("Cannot parse '{input}': {message}")]
    Parse { input: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TfError {
    /// True for the conditions a caller can fix by changing its inputs.
    ///
    /// `OutOfRangeIndex` is the only kind that signals a bug in the search itself.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::OutOfRangeIndex { .. })
    }
}

/// Result type alias for TimerFit operations
pub type TfResult<T> = Result<T, TfError>;

/// Macro for creating range errors
#[macro_export]
macro_rules! range_error {
    ($($arg:tt)*) => {
        $crate::TfError::InvalidRange { message: format!($($arg)*) }
    };
}

/// Macro for creating component set errors
#[macro_export]
macro_rules! component_set_error {
    ($($arg:tt)*) => {
        $crate::TfError::InvalidComponentSet { message: format!($($arg)*) }
    };
}

/// Macro for creating degenerate circuit errors
#[macro_export]
macro_rules! degenerate_error {
    ($($arg:tt)*) => {
        $crate::TfError::DegenerateCircuit { message: format!($($arg)*) }
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::TfError::Config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TfError::OutOfRangeIndex {
            axis: "resistors",
            index: 7,
            len: 3,
        };

        assert!(error.to_string().contains("resistors"));
        assert!(error.to_string().contains('7'));
        assert!(error.to_string().contains("len 3"));
    }

    #[test]
    fn test_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let tf_error: TfError = json_error.into();

        match tf_error {
            TfError::Serialization(_) => (),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_macros() {
        let range = range_error!("min {} > max {}", 2, 1);
        assert!(matches!(range, TfError::InvalidRange { .. }));
        assert!(range.to_string().contains("min 2 > max 1"));

        let set = component_set_error!("empty");
        assert!(matches!(set, TfError::InvalidComponentSet { .. }));

        let degenerate = degenerate_error!("C = {}", 0);
        assert!(matches!(degenerate, TfError::DegenerateCircuit { .. }));

        let config = config_error!("Missing field: {}", "samples");
        assert!(matches!(config, TfError::Config(_)));
    }

    #[test]
    fn test_only_index_errors_are_internal() {
        assert!(!TfError::OutOfRangeIndex {
            axis: "capacitors",
            index: 0,
            len: 0
        }
        .is_input_error());
        assert!(range_error!("bad").is_input_error());
    }
}
