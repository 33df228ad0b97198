//! JSON codec for profile rows.
//!
//! The data service answers `select user_type from profiles where id = ?`
//! with a JSON object. These helpers turn that body into a [`ProfileRow`]
//! (and back, for the in-memory backend and tests).
//!
//! This is behind the `json` feature flag (enabled by default).

#[cfg(feature = "json")]
use crate::{ModelError, ProfileRow};

/// Parses a single profile row from a JSON body.
///
/// Unknown columns are ignored, so a `select *` response decodes as well.
///
/// ## Example
///
/// ```rust
/// use campus_model::{decode_profile, Role};
///
/// let row = decode_profile(br#"{"id":"u-1","user_type":"teacher"}"#).unwrap();
/// assert_eq!(row.role(), Some(Role::Teacher));
/// ```
#[cfg(feature = "json")]
pub fn decode_profile(data: &[u8]) -> Result<ProfileRow, ModelError> {
    serde_json::from_slice(data).map_err(ModelError::Decode)
}

/// Serializes a profile row to JSON bytes.
#[cfg(feature = "json")]
pub fn encode_profile(row: &ProfileRow) -> Result<Vec<u8>, ModelError> {
    serde_json::to_vec(row).map_err(ModelError::Encode)
}
