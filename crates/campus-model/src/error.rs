//! Error types for the model layer.

/// Errors that can occur while parsing or (de)serializing model values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A profile row could not be serialized.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A profile row could not be parsed.
    ///
    /// Common causes: malformed JSON, a missing `id` column, or a
    /// `user_type` that is not a string.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The string is not a valid route path.
    #[error("invalid route: {0}")]
    InvalidRoute(String),
}
