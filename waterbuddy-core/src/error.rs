//! Store error types.

use crate::storage::StorageError;

/// Errors returned by [`HydrationStore`](crate::HydrationStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Registration with an identifier that is already taken
    #[error("'{0}' is already registered")]
    DuplicateIdentifier(String),

    /// Unknown identifier or wrong password
    #[error("Invalid email or password")]
    InvalidCredential,

    /// The identifier has no profile (e.g. a stale session)
    #[error("No profile found for '{0}'")]
    MissingProfile(String),

    /// Registration input failed validation
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Intake amounts must be positive
    #[error("Intake amount must be greater than 0 ml")]
    InvalidAmount,

    /// Daily goals must be positive
    #[error("Daily goal must be greater than 0 ml")]
    InvalidGoal,

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
