//! Data models for the ORCID sync engine.
//!
//! - [`work`]: outbound work submission payloads.
//! - [`profile`]: defensive parsing of the remote works profile.
//! - [`record`]: the structured bag of bibliographic fields a provider returns.

pub mod profile;
pub mod record;
pub mod work;

pub use profile::{KnownIds, WorksProfile};
pub use record::{BibRecord, Signature};
pub use work::{Citation, Contributor, ExternalId, IdKind, PublicationDate, WorkBatch, WorkSubmission, WorkType};
