//! Error types.
//!
//! Creator failures are not wrapped: `get` returns the creator's own
//! `Error` type so the caller sees exactly what the creator produced.
//! The only error this crate defines itself is for strict release.

use thiserror::Error;

/// Returned by `try_release` when a release has no matching claim.
///
/// The lenient `release` treats the same situation as a no-op returning
/// `false`; `try_release` exists for callers that want over-release
/// reported as misuse.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("release of a key that is not loaded")]
    NotLoaded,
}

#[cfg(test)]
mod tests {
    use super::ReleaseError;

    #[test]
    fn display_names_the_condition() {
        assert_eq!(
            ReleaseError::NotLoaded.to_string(),
            "release of a key that is not loaded"
        );
    }
}
