//! Mutations and transfers against the remote store, plus the throttled
//! listing query. Decides what to ask for and when; authentication and
//! transport live behind the collaborator traits.

use std::sync::Arc;

use tracing::{debug, info, warn};

use driveftp_core::config::GatewayConfig;
use driveftp_core::remote::{ByteReader, ChangeNotifier, DriveClient, MetadataStore};
use driveftp_core::types::{ObjectPatch, RemoteObject};
use driveftp_core::{GatewayError, GatewayResult};
use driveftp_upload::{UploadSession, UploadTuning};

use crate::codec::DUP_TOKEN;
use crate::node::VirtualNode;
use crate::throttle::RequestThrottle;

/// Shared by every session; issues all remote mutations and transfers.
pub struct Gateway {
    store: Arc<dyn MetadataStore>,
    drive: Arc<dyn DriveClient>,
    notifier: Arc<dyn ChangeNotifier>,
    throttle: RequestThrottle,
    tuning: UploadTuning,
}

impl Gateway {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        drive: Arc<dyn DriveClient>,
        notifier: Arc<dyn ChangeNotifier>,
        config: &GatewayConfig,
    ) -> Self {
        Gateway {
            store,
            drive,
            notifier,
            throttle: RequestThrottle::from_config(&config.throttle),
            tuning: UploadTuning::from_config(&config.upload),
        }
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    /// Children of a folder. When the throttle spots a listing burst the
    /// folder is refreshed synchronously first; a refresh failure is
    /// logged and the listing is served from whatever is cached.
    pub async fn list_children(&self, folder_id: &str) -> GatewayResult<Vec<RemoteObject>> {
        if self.throttle.should_force_refresh(folder_id) {
            if let Err(e) = self.notifier.refresh_folder(folder_id).await {
                warn!(folder_id, error = %e, "forced folder refresh failed");
            }
        }
        self.store.children(folder_id).await
    }

    /// Rename to the destination's virtual name.
    pub async fn rename(&self, node: &VirtualNode, new_name: &str) -> GatewayResult<bool> {
        if new_name.contains(DUP_TOKEN) {
            warn!(
                new_name,
                "the id token is reserved for generated names, avoid it in filenames"
            );
        }
        info!(from = %node.virtual_name(), to = new_name, "renaming");
        self.apply_patch(node.id(), ObjectPatch::rename(new_name)).await
    }

    /// Set the remote modification time, in epoch milliseconds. Valid for
    /// folders as well as files.
    pub async fn set_modified(&self, node: &VirtualNode, time_millis: i64) -> GatewayResult<bool> {
        info!(name = %node.virtual_name(), time_millis, "updating modification time");
        self.apply_patch(node.id(), ObjectPatch::touch(time_millis)).await
    }

    async fn apply_patch(&self, id: &str, patch: ObjectPatch) -> GatewayResult<bool> {
        if patch.is_noop() {
            return Err(GatewayError::InvalidArgument(
                "patch carries neither a name nor a valid modification time".into(),
            ));
        }
        match self.drive.patch(id, &patch).await? {
            Some(updated) => {
                if let Err(e) = self.notifier.refresh_object(&updated.id).await {
                    warn!(id = %updated.id, error = %e, "post-patch refresh failed");
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move the node's object to the trash and evict it from the cache.
    pub async fn delete(&self, node: &VirtualNode) -> GatewayResult<bool> {
        if !node.exists() {
            return Err(GatewayError::InvalidArgument(format!(
                "cannot delete '{}', it does not exist",
                node.virtual_name()
            )));
        }
        info!(id = %node.id(), name = %node.virtual_name(), "trashing");
        let trashed = self.drive.trash(node.id()).await?;
        if trashed {
            self.store.evict(node.id()).await;
        }
        Ok(trashed)
    }

    /// Create the folder a prospective node stands for.
    pub async fn mkdir(&self, node: &VirtualNode) -> GatewayResult<bool> {
        let Some(parent) = node.parent() else {
            return Err(GatewayError::InvalidArgument(
                "cannot create the root folder".into(),
            ));
        };
        info!(parent = %parent.id(), name = %node.object().name, "creating folder");
        match self.drive.mkdir(parent.id(), &node.object().name).await? {
            Some(created) => {
                if let Err(e) = self.notifier.refresh_object(&created.id).await {
                    warn!(id = %created.id, error = %e, "post-mkdir refresh failed");
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Open remote content for reading, starting at `offset`.
    pub async fn open_input(&self, node: &VirtualNode, offset: u64) -> GatewayResult<ByteReader> {
        debug!(id = %node.id(), offset, "opening download stream");
        self.drive.open_reader(node.object(), offset).await
    }

    /// Open an upload for the node's object. Restart offsets are not
    /// supported by the remote upload protocol and are ignored.
    pub fn open_output(&self, node: &VirtualNode) -> GatewayResult<UploadSession> {
        debug!(name = %node.virtual_name(), exists = node.exists(), "opening upload stream");
        UploadSession::new(
            self.drive.clone(),
            node.object().clone(),
            self.tuning.clone(),
        )
    }
}
