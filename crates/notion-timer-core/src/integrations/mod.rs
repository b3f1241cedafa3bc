pub mod notion;
pub mod traits;

pub use notion::{page_payload, NotionSubmitter};
pub use traits::{RecordSubmitter, RemoteRecordId};
