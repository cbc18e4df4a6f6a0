//! Path-string to virtual-node resolution.

use std::sync::Arc;

use tracing::{debug, info};

use driveftp_core::remote::MetadataStore;
use driveftp_core::types::{NameLookup, RemoteObject};
use driveftp_core::GatewayResult;

use crate::codec::NameCodec;
use crate::node::VirtualNode;
use crate::path;

/// Resolves FTP path strings against the metadata store.
///
/// Supported path shapes: absolute (`/`, `/file.txt`, `/folder/file.txt`),
/// relative to the session's current directory or an explicit base folder,
/// and any of those with id-encoded components
/// (`/folder__ID__<id>__ID__/file.txt`). The special components `.` and
/// `..` are the session's business and never reach this resolver.
pub struct PathResolver {
    store: Arc<dyn MetadataStore>,
    codec: Arc<NameCodec>,
}

impl PathResolver {
    pub fn new(store: Arc<dyn MetadataStore>, codec: Arc<NameCodec>) -> Self {
        PathResolver { store, codec }
    }

    /// Resolve `path_str` to a node. An unknown final component yields a
    /// prospective node under its resolved parent (create-on-write needs
    /// it); `None` only when no valid parent folder could be determined.
    pub async fn resolve(
        &self,
        current: &VirtualNode,
        base: Option<&VirtualNode>,
        path_str: &str,
    ) -> GatewayResult<Option<VirtualNode>> {
        if path::equals(&current.abs_path(), path_str) {
            debug!(path = path_str, "requested path is the current directory");
            return Ok(Some(current.clone()));
        }

        let (start, remainder) = if path_str.starts_with(path::SEPARATOR) {
            let current_prefix = path::join(&current.abs_path(), path::SEPARATOR);
            if let Some(rest) = path_str.strip_prefix(current_prefix.as_str()) {
                // virtual duplicate-name paths can look absolute while
                // still being scoped under the session
                (current.clone(), rest)
            } else {
                let mut root = current.clone();
                while !root.is_root() {
                    root = match root.clone().into_parent() {
                        Some(parent) => parent,
                        None => break,
                    };
                }
                (root, &path_str[1..])
            }
        } else {
            match base {
                Some(folder) => (folder.clone(), path_str),
                None => (current.clone(), path_str),
            }
        };

        debug!(path = remainder, folder = %start.abs_path(), "walking path");
        let mut folder = Some(start);
        for part in path::components(remainder) {
            let Some(here) = folder else {
                debug!(path = remainder, "path walk lost its folder");
                return Ok(None);
            };
            folder = Some(self.lookup(here, part).await?);
        }
        Ok(folder)
    }

    /// One-component lookup inside `folder`. Always yields a node: a real
    /// one on a match, a prospective one otherwise.
    async fn lookup(&self, folder: VirtualNode, file_name: &str) -> GatewayResult<VirtualNode> {
        let (plain, embedded_id) = self.codec.decode(file_name);

        if let Some(id) = embedded_id {
            if let Some(object) = self.store.object_by_id(&id).await? {
                // id matched; require the plain name to match too, so a
                // stale or mistyped id cannot alias an unrelated object.
                // Parent containment is not verified.
                if self.codec.sanitize(&object.name) == plain {
                    debug!(name = file_name, "encoded lookup hit");
                    return Ok(decorate(&self.codec, folder, object, file_name));
                }
            }
            info!(name = file_name, id = %id, "encoded name does not match any object");
        } else {
            match self.store.object_by_name(folder.id(), file_name).await? {
                NameLookup::Found(object) => {
                    debug!(name = file_name, "name lookup hit");
                    return Ok(decorate(&self.codec, folder, object, file_name));
                }
                NameLookup::Missing => {
                    debug!(name = file_name, "name lookup miss");
                }
                NameLookup::Duplicated => {
                    // the real files are only addressable through their
                    // encoded virtual names; under this plain name the
                    // target virtually does not exist
                    info!(name = file_name, "ambiguous plain name treated as missing");
                }
            }
        }

        let prospective = RemoteObject::prospective(folder.id(), file_name);
        Ok(decorate(&self.codec, folder, prospective, file_name))
    }
}

/// Wrap `object` as a child node of `folder`, re-running the sanitize step
/// on the display name. A stored name may itself contain illegal
/// characters; when sanitizing changes it, the cleaned name is re-encoded
/// with the object id so it stays uniquely addressable.
pub(crate) fn decorate(
    codec: &NameCodec,
    folder: VirtualNode,
    object: RemoteObject,
    display_name: &str,
) -> VirtualNode {
    let sanitized = codec.sanitize(display_name);
    let virtual_name = if sanitized != display_name {
        let encoded = codec.encode(&sanitized, &object.id);
        info!(name = display_name, virtual_name = %encoded, "illegal characters masked");
        encoded
    } else {
        display_name.to_string()
    };
    VirtualNode::child(folder, object, virtual_name)
}
