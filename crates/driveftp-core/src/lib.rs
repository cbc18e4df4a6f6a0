//! driveftp-core: shared types, collaborator traits, error type, and config schema

pub mod config;
pub mod error;
pub mod remote;
pub mod types;

pub use error::{GatewayError, GatewayResult};
pub use types::{ChunkStatus, ContentRange, NameLookup, ObjectPatch, RemoteObject, SessionInit, UploadMetadata};
