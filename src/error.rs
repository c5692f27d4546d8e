use thiserror::Error;

/// Все исходы восстановимы для вызывающего: движок никогда не паникует
/// и не оставляет место в полуизменённом состоянии.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Unknown seat, zone or category id.
    #[error("not found")]
    NotFound,

    /// Lost a race to another client. Retry the user intent, not the
    /// same conditional write.
    #[error("seat is taken by another client")]
    Conflict,

    /// Conditional update saw a newer version than expected. Internal
    /// retry signal; surfaces as `Conflict` if retries run out.
    #[error("version conflict")]
    VersionConflict,

    /// Caller is not the current holder of the seat.
    #[error("caller does not hold this seat")]
    Forbidden,

    /// Requested transition is not legal from the current state.
    #[error("invalid transition")]
    InvalidTransition,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
