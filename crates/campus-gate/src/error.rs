//! Error types for the gate layer.

/// Errors returned by [`GateHandle`](crate::GateHandle) operations.
///
/// The gate itself never fails outward: backend and navigation failures
/// become state changes inside the actor. The only thing a caller can
/// observe is the actor being gone.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The gate actor has stopped (shut down or dropped).
    #[error("gate is unavailable")]
    Unavailable,
}
