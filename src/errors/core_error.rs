use std::error::Error as StdError;
use std::fmt;

/// Failure categories surfaced by the orchestration core.
///
/// `NotFoundOrForbidden` deliberately collapses "does not exist" and "exists
/// but is owned by someone else" into one outcome so that resource existence
/// is never leaked to non-owners.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    Unauthorized,
    NotFoundOrForbidden,
    Validation,
    Conflict,
    PreconditionFailed,
    Downstream,
    Internal,
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unauthorized, message)
    }

    pub fn not_found_or_forbidden() -> Self {
        Self::new(CoreErrorKind::NotFoundOrForbidden, "Resource not found")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Conflict, message)
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::PreconditionFailed, message)
    }

    pub fn downstream(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Downstream, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        let mut wrapped = CoreError::internal("Unhandled error");
        wrapped.source = Some(err.into());
        wrapped
    }
}

/// Maps store errors at the service boundary. Unique-constraint violations
/// become `Conflict`; everything else is an internal failure whose raw detail
/// is logged, never surfaced to the caller.
impl From<sea_orm::DbErr> for CoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        if matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
            tracing::debug!(error = %err, "unique constraint violation");
            return CoreError::conflict("Resource already exists").with_source(err);
        }
        tracing::error!(error = %err, "database error");
        CoreError::internal("Database error").with_source(err)
    }
}
