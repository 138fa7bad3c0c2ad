use thiserror::Error;

/// Structured failure modes surfaced by scenario loading and by the tick loop.
///
/// `SchemaError` aborts a run before tick 0. `InvariantViolation` is fatal in
/// debug builds and clamped-with-diagnostic in release. `NumericError` and
/// `LookupError` are always fatal: both indicate a programmer bug rather than
/// a bad scenario.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("schema error: {0}")]
    SchemaError(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("numeric error: {0}")]
    NumericError(String),

    #[error("lookup error: {0}")]
    LookupError(String),
}

impl SimError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::NumericError(msg.into())
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::LookupError(msg.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;

/// Checks a post-tick invariant. In debug builds a violation is fatal; in
/// release it is clamped by the caller and recorded in `reports`.
///
/// Returns `true` if the invariant held.
pub fn check_invariant(condition: bool, reports: &mut Vec<String>, msg: impl Into<String>) -> SimResult<bool> {
    if condition {
        return Ok(true);
    }
    let msg = msg.into();
    if cfg!(debug_assertions) {
        return Err(SimError::invariant(msg));
    }
    reports.push(format!("invariant clamped: {msg}"));
    Ok(false)
}

/// Rejects non-finite values as a `NumericError`, per §4.1 failure semantics.
pub fn require_finite(value: f64, label: &str) -> SimResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::numeric(format!("{label} produced a non-finite value: {value}")))
    }
}
