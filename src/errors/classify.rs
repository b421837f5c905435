use std::error::Error;
use std::fmt;

use super::codes::ErrorCode;
use super::failure::{Failure, ValidationFailure};
use super::response::ErrorResponse;

/// Classification tag selecting the response template for a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    Validation,
    Unhandled,
}

impl FailureCategory {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation => ErrorCode::Validation,
            Self::Unhandled => ErrorCode::Unhandled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unhandled => "unhandled",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raised failure after type inspection.
///
/// The unhandled message is kept for diagnostics only and never reaches the
/// response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedFailure {
    Validation { errors: Vec<String> },
    Unhandled { message: String },
}

impl ClassifiedFailure {
    /// Classify by walking the error and its `source()` chain.
    ///
    /// A `Failure` anywhere in the chain decides the category by its variant,
    /// so whatever an explicit `Failure::Unhandled` wraps stays hidden.
    /// Anything that is not a validation failure falls through to `Unhandled`.
    pub fn classify(failure: &(dyn Error + 'static)) -> Self {
        for err in error_chain(failure) {
            if let Some(raised) = err.downcast_ref::<Failure>() {
                return match raised {
                    Failure::Validation(validation) => Self::Validation {
                        errors: validation.errors.clone(),
                    },
                    Failure::Unhandled(_) => Self::unhandled(failure),
                };
            }

            if let Some(validation) = err.downcast_ref::<ValidationFailure>() {
                return Self::Validation {
                    errors: validation.errors.clone(),
                };
            }
        }

        Self::unhandled(failure)
    }

    fn unhandled(failure: &(dyn Error + 'static)) -> Self {
        Self::Unhandled {
            message: failure.to_string(),
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Validation { .. } => FailureCategory::Validation,
            Self::Unhandled { .. } => FailureCategory::Unhandled,
        }
    }

    pub fn into_response_body(self) -> ErrorResponse {
        match self {
            Self::Validation { errors } => ErrorResponse::validation(errors),
            Self::Unhandled { .. } => ErrorResponse::unhandled(),
        }
    }
}

/// Iterate an error followed by each of its sources
pub fn error_chain<'a>(
    err: &'a (dyn Error + 'static),
) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PanicFailure;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("could not create user")]
    struct CreateUserError {
        #[source]
        cause: ValidationFailure,
    }

    #[test]
    fn test_classify_validation_failure() {
        let failure = ValidationFailure::new(["Error1, Error2"]);
        let classified = ClassifiedFailure::classify(&failure);
        assert_eq!(
            classified,
            ClassifiedFailure::Validation {
                errors: vec!["Error1, Error2".to_string()]
            }
        );
        assert_eq!(classified.category(), FailureCategory::Validation);
    }

    #[test]
    fn test_classify_failure_enum() {
        let failure = Failure::validation(["a", "b"]);
        assert_eq!(
            ClassifiedFailure::classify(&failure),
            ClassifiedFailure::Validation {
                errors: vec!["a".to_string(), "b".to_string()]
            }
        );

        let failure = Failure::unhandled("Oooops error!");
        assert_eq!(
            ClassifiedFailure::classify(&failure).category(),
            FailureCategory::Unhandled
        );
    }

    #[test]
    fn test_classify_wrapped_validation_failure() {
        let failure = CreateUserError {
            cause: ValidationFailure::new(["email is invalid"]),
        };
        assert_eq!(
            ClassifiedFailure::classify(&failure).category(),
            FailureCategory::Validation
        );
    }

    #[test]
    fn test_explicit_unhandled_hides_wrapped_validation() {
        let failure = Failure::unhandled(ValidationFailure::new([
            "upstream billing api rejected account_id=998877",
        ]));
        let classified = ClassifiedFailure::classify(&failure);
        assert_eq!(classified.category(), FailureCategory::Unhandled);
        assert_eq!(classified.into_response_body(), ErrorResponse::unhandled());
    }

    #[test]
    fn test_nested_unhandled_failure_decides_category() {
        #[derive(Debug, Error)]
        #[error("billing sync failed")]
        struct SyncError {
            #[source]
            cause: Failure,
        }

        let failure = SyncError {
            cause: Failure::unhandled(ValidationFailure::new(["internal detail"])),
        };
        assert_eq!(
            ClassifiedFailure::classify(&failure).category(),
            FailureCategory::Unhandled
        );
    }

    #[test]
    fn test_classify_unknown_error_defaults_to_unhandled() {
        let failure = std::io::Error::new(std::io::ErrorKind::Other, "Oooops error!");
        let classified = ClassifiedFailure::classify(&failure);
        assert_eq!(
            classified,
            ClassifiedFailure::Unhandled {
                message: "Oooops error!".to_string()
            }
        );
        assert_eq!(classified.into_response_body(), ErrorResponse::unhandled());
    }

    #[test]
    fn test_classify_panic_is_unhandled() {
        let failure = PanicFailure {
            message: "index out of bounds".to_string(),
        };
        assert_eq!(
            ClassifiedFailure::classify(&failure).category(),
            FailureCategory::Unhandled
        );
    }

    #[test]
    fn test_unhandled_message_never_reaches_body() {
        let body = ClassifiedFailure::Unhandled {
            message: "secret connection string".to_string(),
        }
        .into_response_body();
        let json = String::from_utf8(body.to_json_bytes().unwrap()).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_error_chain_walks_sources() {
        let failure = CreateUserError {
            cause: ValidationFailure::new(["x"]),
        };
        assert_eq!(error_chain(&failure).count(), 2);
    }
}
