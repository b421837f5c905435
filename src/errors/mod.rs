//! Failure taxonomy and structured error bodies

pub mod classify;
pub mod codes;
pub mod failure;
pub mod response;

pub use classify::{error_chain, ClassifiedFailure, FailureCategory};
pub use codes::ErrorCode;
pub use failure::{Failure, PanicFailure, RaisedFailure, ValidationFailure};
pub use response::ErrorResponse;
