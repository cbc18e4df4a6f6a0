//! Collaborator traits: the seams between this core and the processes that
//! actually hold metadata, talk HTTP to the drive API, and run background
//! synchronization.
//!
//! This crate only decides *what* to ask for and *when*; authentication,
//! transport, and transport-level retries live behind `DriveClient`.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::GatewayResult;
use crate::types::{
    ChunkStatus, ContentRange, NameLookup, ObjectPatch, RemoteObject, SessionInit, UploadMetadata,
};

/// Streaming handle for remote file content.
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Read access to the local metadata cache of the remote store.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch an object by its opaque id.
    async fn object_by_id(&self, id: &str) -> GatewayResult<Option<RemoteObject>>;

    /// Exact-name lookup inside a folder. More than one exact match is
    /// reported as [`NameLookup::Duplicated`], not as an error.
    async fn object_by_name(&self, parent_id: &str, name: &str) -> GatewayResult<NameLookup>;

    /// Children of a folder, in cache order.
    async fn children(&self, folder_id: &str) -> GatewayResult<Vec<RemoteObject>>;

    /// Drop a cached entry (called after a successful trash).
    async fn evict(&self, id: &str);
}

/// Mutations and content transfer against the remote drive API.
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// Patch name and/or modification time. Returns the updated object, or
    /// `None` when the remote rejected the patch.
    async fn patch(&self, id: &str, patch: &ObjectPatch) -> GatewayResult<Option<RemoteObject>>;

    /// Move an object to the trash. Returns false when the remote refused.
    async fn trash(&self, id: &str) -> GatewayResult<bool>;

    /// Create a folder. Returns the created object, or `None` on refusal.
    async fn mkdir(&self, parent_id: &str, name: &str) -> GatewayResult<Option<RemoteObject>>;

    /// Open a content stream starting at `offset`.
    async fn open_reader(&self, object: &RemoteObject, offset: u64) -> GatewayResult<ByteReader>;

    /// Single-shot create-or-update. `existing_id` selects the update
    /// variant; `content` is `(content_type, bytes)`, absent for a
    /// metadata-only commit.
    async fn commit(
        &self,
        existing_id: Option<&str>,
        meta: &UploadMetadata,
        content: Option<(&str, &[u8])>,
    ) -> GatewayResult<RemoteObject>;

    /// Initiate a resumable upload session, declaring the content type.
    async fn begin_resumable(
        &self,
        existing_id: Option<&str>,
        meta: &UploadMetadata,
        content_type: &str,
    ) -> GatewayResult<SessionInit>;

    /// Send one chunk to an open session with its content-range declaration.
    async fn upload_chunk(
        &self,
        session_uri: &str,
        content_type: &str,
        body: &[u8],
        range: &ContentRange,
    ) -> GatewayResult<ChunkStatus>;
}

/// Trigger for the background synchronization service.
///
/// `refresh_folder` is awaited by the listing path when the burst throttle
/// fires; `refresh_object` is a post-mutation signal. Failures from either
/// are logged by callers and never block serving cached metadata.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn refresh_folder(&self, folder_id: &str) -> GatewayResult<()>;
    async fn refresh_object(&self, id: &str) -> GatewayResult<()>;
}
