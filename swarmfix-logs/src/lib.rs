//! Log corpus ingestion.
//!
//! swarmfix consumes build output produced elsewhere: logs captured inline by the CI job and
//! files unpacked from downloaded artifact bundles. Loading is tolerant on purpose. A source
//! that is missing or unreadable is skipped, and undecodable bytes are replaced, so the rules
//! always get a buffer (possibly empty) to look at.

mod buffer;
mod load;
mod source;

pub use buffer::{LogBuffers, TextBuffer};
pub use load::{DomainSources, LogSources, load_all, load_domain};
pub use source::{ArtifactSource, FsArtifactSource, InMemoryArtifactSource, NamedBlob};
