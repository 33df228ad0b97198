/// Errors that can occur in the navigation layer.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// The navigator was closed (its screen tree is gone).
    #[error("navigator closed")]
    Closed,
}
