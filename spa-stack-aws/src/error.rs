use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Route 53 error: {0}")]
    Route53Error(String),
    #[error("CloudFormation error: {0}")]
    CloudFormationError(String),
    #[error("Stack '{stack}' ended in {status}: {reason}")]
    StackFailed {
        stack: String,
        status: String,
        reason: String,
    },
    #[error("Template error: {0}")]
    TemplateError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;
