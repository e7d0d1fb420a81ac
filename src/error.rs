use crate::{RegionId, StateId};

/// Everything that can go wrong while building, querying or patching a
/// [`RegionDatabase`](crate::RegionDatabase).
///
/// None of these are recovered from internally (except for [`Error::AllocatorExhausted`],
/// which the database handles by growing). An error returned from an update means the
/// upstream classification and the database disagree, and the database should be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The oracle found no Path between two states that were declared to be connected
    #[error("no path from state {from} to state {to}, although their regions are neighbors")]
    UnreachablePath {
        /// the start of the failed search
        from: StateId,
        /// the goal of the failed search
        to: StateId,
    },
    /// One of the table invariants was broken before or during an update
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// The free pool of the slot allocator is empty
    #[error("no free region slot left")]
    AllocatorExhausted,
    /// The id does not refer to a live Region
    #[error("region {0} does not exist")]
    UnknownRegion(RegionId),
    /// A snapshot could not be turned back into a table
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

/// `Result` specialized on this crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

macro_rules! violation {
    ($($arg:tt)*) => {
        $crate::Error::InvariantViolation(format!($($arg)*))
    };
}
pub(crate) use violation;
