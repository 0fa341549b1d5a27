use thiserror::Error;

/// Errors raised while turning class declarations into a diagram model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Strict mode only: a type is neither user-defined nor known foreign.
    #[error("unresolved type `{type_name}` referenced from `{entity}`")]
    UnresolvedType { entity: String, type_name: String },

    /// The input does not have the expected shape. Fatal for the whole run.
    #[error("malformed declaration `{entity}`: {reason}")]
    MalformedDeclaration { entity: String, reason: String },

    /// Two declarations share a qualified name. The first one wins.
    #[error("duplicate entity `{name}`; keeping the first declaration")]
    DuplicateEntity { name: String },

    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub(crate) fn malformed(entity: &str, reason: impl Into<String>) -> Self {
        AnalysisError::MalformedDeclaration {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the whole run rather than one entity.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::MalformedDeclaration { .. } | AnalysisError::Cancelled
        )
    }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::UnresolvedType {
            entity: "home.Hub".to_string(),
            type_name: "Widget".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unresolved type `Widget` referenced from `home.Hub`"
        );
        assert!(!err.is_fatal());
        assert!(AnalysisError::malformed("X", "empty field name").is_fatal());
        assert!(AnalysisError::Cancelled.is_fatal());
    }
}
