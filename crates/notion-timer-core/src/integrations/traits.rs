use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;
use crate::storage::Credentials;
use crate::timer::CompletedInterval;

/// Identifier of the row the remote database created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteRecordId(pub String);

impl fmt::Display for RemoteRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a completed interval into one remote create-record call.
///
/// Implementations make a single attempt and never retry; the caller keeps
/// its local state on failure and decides whether to try again.
pub trait RecordSubmitter {
    fn submit(
        &self,
        interval: &CompletedInterval,
        credentials: &Credentials,
    ) -> Result<RemoteRecordId, SubmissionError>;
}

impl<R: RecordSubmitter + ?Sized> RecordSubmitter for &R {
    fn submit(
        &self,
        interval: &CompletedInterval,
        credentials: &Credentials,
    ) -> Result<RemoteRecordId, SubmissionError> {
        (**self).submit(interval, credentials)
    }
}
