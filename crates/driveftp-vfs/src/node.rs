//! The hierarchical, protocol-facing view of one remote object.

use driveftp_core::types::RemoteObject;

use crate::path;

/// One resolved position in the virtual namespace.
///
/// A node owns its ancestry as a chain of boxed parents; chains are built
/// fresh per lookup and never cached, so two resolutions of the same path
/// yield independent values. The virtual name starts as the (possibly
/// sanitized and re-encoded) lookup name and may be rewritten once more by
/// the listing collision pass.
#[derive(Debug, Clone)]
pub struct VirtualNode {
    object: RemoteObject,
    virtual_name: String,
    parent: Option<Box<VirtualNode>>,
}

impl VirtualNode {
    /// The namespace root: no parent, named by the path separator.
    pub fn root(object: RemoteObject) -> Self {
        VirtualNode {
            object,
            virtual_name: path::SEPARATOR.to_string(),
            parent: None,
        }
    }

    /// A child of `parent`, shown under `virtual_name`.
    pub fn child(parent: VirtualNode, object: RemoteObject, virtual_name: String) -> Self {
        VirtualNode {
            object,
            virtual_name,
            parent: Some(Box::new(parent)),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn id(&self) -> &str {
        &self.object.id
    }

    /// The name shown to FTP clients. Distinct from the remote object's
    /// real name whenever sanitizing or collision encoding applied.
    pub fn virtual_name(&self) -> &str {
        &self.virtual_name
    }

    pub fn set_virtual_name(&mut self, virtual_name: String) {
        self.virtual_name = virtual_name;
    }

    pub fn exists(&self) -> bool {
        self.object.exists
    }

    pub fn is_directory(&self) -> bool {
        self.object.is_directory
    }

    pub fn size(&self) -> u64 {
        self.object.size
    }

    pub fn last_modified(&self) -> i64 {
        self.object.last_modified
    }

    pub fn owner_name(&self) -> &str {
        &self.object.owner_name
    }

    /// Number of remote parents (an object can live in several folders).
    pub fn link_count(&self) -> usize {
        self.object.parents.len()
    }

    pub fn parent(&self) -> Option<&VirtualNode> {
        self.parent.as_deref()
    }

    /// Drop this node and step up to its parent, if any.
    pub fn into_parent(self) -> Option<VirtualNode> {
        self.parent.map(|p| *p)
    }

    pub fn object(&self) -> &RemoteObject {
        &self.object
    }

    pub fn into_object(self) -> RemoteObject {
        self.object
    }

    /// Absolute virtual path: `/` for the root, `/name` for its children,
    /// `/folder/name` below that.
    pub fn abs_path(&self) -> String {
        match &self.parent {
            None => self.virtual_name.clone(),
            Some(parent) if parent.is_root() => {
                format!("{}{}", path::SEPARATOR, self.virtual_name)
            }
            Some(parent) => path::join(&parent.abs_path(), &self.virtual_name),
        }
    }
}
