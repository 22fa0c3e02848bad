use thiserror::Error;

use crate::models::Location;

/// Problems with individual records. None of them abort a grouping run; the
/// offending record is dropped and reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record at {location} has neither license text nor license identifier")]
    InvalidRecord { location: Location },
}
