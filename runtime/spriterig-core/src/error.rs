use std::io;
use thiserror::Error;

/// Error types for rig construction, editing and pose resolution
#[derive(Error, Debug)]
pub enum RigError {
    /// I/O error while reading a project document
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON in a project document
    #[cfg(feature = "serde-support")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A bone's parent chain leads back to itself
    #[error("Structural cycle: bone '{bone}' is its own ancestor ({})", chain.join(" -> "))]
    StructuralCycle { bone: String, chain: Vec<String> },

    /// A string does not name any variant of a closed enum
    #[error("Unknown {kind} value: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Two records share a name that must be unique
    #[error("Duplicate {kind} name: '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    /// An edit names a record that does not exist
    #[error("Reference error: {0}")]
    ReferenceError(String),

    /// A value violates a data model invariant
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl RigError {
    /// Create an unknown variant error
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Whether this error came from a cycle in the bone hierarchy
    pub fn is_structural_cycle(&self) -> bool {
        matches!(self, Self::StructuralCycle { .. })
    }
}

/// Result type using RigError
pub type Result<T> = std::result::Result<T, RigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = RigError::StructuralCycle {
            bone: "a".to_string(),
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Structural cycle: bone 'a' is its own ancestor (a -> b -> a)"
        );
        assert!(err.is_structural_cycle());
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = RigError::unknown_variant("layer", "sideways");
        assert_eq!(err.to_string(), "Unknown layer value: 'sideways'");
        assert!(!err.is_structural_cycle());
    }
}
