pub mod hash;
pub mod snapshot;
pub mod session;
pub mod storage;
pub mod presentation;
pub mod preview;
pub mod config;
pub mod error;

pub use hash::{fingerprint, fingerprint_of};
pub use snapshot::DataSnapshot;
pub use session::{SessionStorage, MemorySessionStorage, FileSessionStorage};
pub use storage::SnapshotStore;
pub use presentation::{
    age_in_minutes, describe_age, format_timestamp, validate, SnapshotStatus, SnapshotValidation,
};
pub use preview::ReportPreview;
pub use config::SnapshotConfig;
pub use error::{SnapshotError, Result};
