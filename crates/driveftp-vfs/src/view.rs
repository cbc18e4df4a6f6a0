//! Per-connection navigation state and directory listing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use driveftp_core::remote::ByteReader;
use driveftp_core::{GatewayError, GatewayResult};
use driveftp_upload::UploadSession;

use crate::codec::NameCodec;
use crate::gateway::Gateway;
use crate::node::VirtualNode;
use crate::path;
use crate::resolver::{self, PathResolver};

/// The file-system-view contract the FTP command engine drives from
/// protocol commands. One implementation per connection.
#[async_trait]
pub trait FileSystemView: Send + Sync {
    async fn home_directory(&self) -> GatewayResult<VirtualNode>;

    async fn working_directory(&self) -> GatewayResult<VirtualNode>;

    /// Returns false (without changing state) when the target does not
    /// exist or is not a directory.
    async fn change_working_directory(&self, path: &str) -> GatewayResult<bool>;

    /// Resolve a path for any command needing a node. `None` means the
    /// path could not be resolved at all; a prospective node is returned
    /// for well-formed paths whose target does not exist yet.
    async fn get_file(&self, path: &str) -> GatewayResult<Option<VirtualNode>>;

    /// Children of `folder` with pairwise-distinct virtual names, in the
    /// order the metadata store produced them.
    async fn list_files(&self, folder: &VirtualNode) -> GatewayResult<Vec<VirtualNode>>;

    async fn delete(&self, node: &VirtualNode) -> GatewayResult<bool>;

    async fn rename(&self, node: &VirtualNode, new_name: &str) -> GatewayResult<bool>;

    async fn mkdir(&self, node: &VirtualNode) -> GatewayResult<bool>;

    async fn set_modified(&self, node: &VirtualNode, time_millis: i64) -> GatewayResult<bool>;

    async fn open_read(&self, node: &VirtualNode, offset: u64) -> GatewayResult<ByteReader>;

    async fn open_write(&self, node: &VirtualNode) -> GatewayResult<UploadSession>;
}

struct Nav {
    home: VirtualNode,
    current: VirtualNode,
}

/// Per-session view state. Navigation is initialized on first use, at
/// most once even when two commands race over one fresh session: the
/// session mutex serializes the first access.
pub struct SessionView {
    gateway: Arc<Gateway>,
    resolver: PathResolver,
    codec: Arc<NameCodec>,
    root_id: String,
    case_insensitive: bool,
    nav: Mutex<Option<Nav>>,
}

impl SessionView {
    pub fn new(
        gateway: Arc<Gateway>,
        codec: Arc<NameCodec>,
        root_id: String,
        case_insensitive: bool,
    ) -> Self {
        let resolver = PathResolver::new(gateway.store().clone(), codec.clone());
        SessionView {
            gateway,
            resolver,
            codec,
            root_id,
            case_insensitive,
            nav: Mutex::new(None),
        }
    }

    /// Build the home node now instead of on first command. Safe to call
    /// more than once; later calls are no-ops.
    pub async fn ensure_initialized(&self) -> GatewayResult<()> {
        let mut nav = self.nav.lock().await;
        self.init_nav(&mut nav).await?;
        Ok(())
    }

    async fn init_nav<'a>(&self, nav: &'a mut Option<Nav>) -> GatewayResult<&'a mut Nav> {
        if let Some(state) = nav {
            return Ok(state);
        }
        info!(root_id = %self.root_id, "initializing session view");
        let root = self
            .gateway
            .store()
            .object_by_id(&self.root_id)
            .await?
            .ok_or_else(|| {
                GatewayError::Metadata(format!("root folder '{}' is not cached", self.root_id))
            })?;
        let home = VirtualNode::root(root);
        Ok(nav.insert(Nav {
            current: home.clone(),
            home,
        }))
    }

    fn normalize(&self, name: &str) -> String {
        if self.case_insensitive {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }
}

#[async_trait]
impl FileSystemView for SessionView {
    async fn home_directory(&self) -> GatewayResult<VirtualNode> {
        let mut nav = self.nav.lock().await;
        let state = self.init_nav(&mut nav).await?;
        Ok(state.home.clone())
    }

    async fn working_directory(&self) -> GatewayResult<VirtualNode> {
        let mut nav = self.nav.lock().await;
        let state = self.init_nav(&mut nav).await?;
        Ok(state.current.clone())
    }

    async fn change_working_directory(&self, path_str: &str) -> GatewayResult<bool> {
        let mut nav = self.nav.lock().await;
        let state = self.init_nav(&mut nav).await?;

        debug!(from = %state.current.abs_path(), to = path_str, "changing working directory");

        if path::equals(path::SEPARATOR, path_str) {
            state.current = state.home.clone();
            return Ok(true);
        }
        if path::equals(path::SELF, path_str) {
            return Ok(true);
        }
        if path::equals(path::PARENT, path_str) {
            if let Some(parent) = state.current.parent().cloned() {
                state.current = parent;
            }
            // at the root ".." stays put, still a success
            return Ok(true);
        }

        match self.resolver.resolve(&state.current, None, path_str).await? {
            Some(node) if node.exists() && node.is_directory() => {
                state.current = node;
                Ok(true)
            }
            other => {
                warn!(
                    path = path_str,
                    resolved = other.is_some(),
                    "target does not exist or is not a directory"
                );
                Ok(false)
            }
        }
    }

    async fn get_file(&self, path_str: &str) -> GatewayResult<Option<VirtualNode>> {
        let mut nav = self.nav.lock().await;
        let state = self.init_nav(&mut nav).await?;

        debug!(path = path_str, "getting file");

        // an empty argument and "./" both mean the current directory
        if path_str.is_empty() || path::equals("./", path_str) {
            return Ok(Some(state.current.clone()));
        }

        self.resolver.resolve(&state.current, None, path_str).await
    }

    async fn list_files(&self, folder: &VirtualNode) -> GatewayResult<Vec<VirtualNode>> {
        info!(path = %folder.abs_path(), "listing");

        let children = self.gateway.list_children(folder.id()).await?;
        if children.is_empty() {
            return Ok(Vec::new());
        }

        let mut nodes: Vec<VirtualNode> = Vec::with_capacity(children.len());
        let mut first_seen: HashMap<String, usize> = HashMap::with_capacity(children.len());

        // single left-to-right collision pass: the first collision for a
        // normalized name re-encodes both colliders; later collisions on
        // the same name re-encode themselves (each carries its own id)
        for object in children {
            let display = object.name.clone();
            let node = resolver::decorate(&self.codec, folder.clone(), object, &display);
            let name = node.virtual_name().to_string();
            let index = nodes.len();
            nodes.push(node);

            match first_seen.get(&self.normalize(&name)) {
                None => {
                    first_seen.insert(self.normalize(&name), index);
                }
                Some(&first) => {
                    let first_encoded = self.codec.encode(&name, nodes[first].id());
                    nodes[first].set_virtual_name(first_encoded);
                    let own_encoded = self.codec.encode(&name, nodes[index].id());
                    nodes[index].set_virtual_name(own_encoded);
                    info!(name = %name, "generated virtual names for duplicated file");
                }
            }
        }

        Ok(nodes)
    }

    async fn delete(&self, node: &VirtualNode) -> GatewayResult<bool> {
        self.gateway.delete(node).await
    }

    async fn rename(&self, node: &VirtualNode, new_name: &str) -> GatewayResult<bool> {
        self.gateway.rename(node, new_name).await
    }

    async fn mkdir(&self, node: &VirtualNode) -> GatewayResult<bool> {
        self.gateway.mkdir(node).await
    }

    async fn set_modified(&self, node: &VirtualNode, time_millis: i64) -> GatewayResult<bool> {
        self.gateway.set_modified(node, time_millis).await
    }

    async fn open_read(&self, node: &VirtualNode, offset: u64) -> GatewayResult<ByteReader> {
        self.gateway.open_input(node, offset).await
    }

    async fn open_write(&self, node: &VirtualNode) -> GatewayResult<UploadSession> {
        self.gateway.open_output(node)
    }
}
