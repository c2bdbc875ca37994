mod compatibility;
mod distance;
mod matcher;

use thiserror::Error;

pub use compatibility::compatible_donor_types;
pub use distance::{haversine_km, round_km};
pub use matcher::{find_matches, find_matches_for_request, MatchCandidate};

/// Matching-input failures abort the whole match call; partial candidate
/// lists are never returned.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Blood request not found")]
    RequestNotFound,

    #[error("Clinic location not found")]
    ClinicLocationMissing,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
