use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A file or folder as represented by the backing cloud store.
///
/// Identity is the opaque `id`, not the name: names may repeat within a
/// folder, and an object may hang under several parents at once. An object
/// with `exists == false` is *prospective* — synthesized by path resolution
/// for a target that has not been created remotely yet (create-on-write and
/// mkdir both go through a prospective object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub id: String,
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
    /// Last modification time, epoch milliseconds
    pub last_modified: i64,
    pub owner_name: String,
    /// Parent folder ids (an object may be multi-parented)
    pub parents: BTreeSet<String>,
    /// False for an object that has not been created remotely yet
    pub exists: bool,
}

impl RemoteObject {
    /// Synthesize a prospective (not-yet-created) object under one parent.
    pub fn prospective(parent_id: &str, name: &str) -> Self {
        RemoteObject {
            id: String::new(),
            name: name.to_string(),
            is_directory: false,
            size: 0,
            last_modified: 0,
            owner_name: String::new(),
            parents: BTreeSet::from([parent_id.to_string()]),
            exists: false,
        }
    }
}

/// A metadata patch applied to a remote object (rename and/or touch).
///
/// Only explicitly set fields are transmitted. A patch carrying neither a
/// new name nor a positive timestamp is rejected before any remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPatch {
    pub name: Option<String>,
    /// New modification time, epoch milliseconds (values <= 0 are ignored)
    pub last_modified: Option<i64>,
}

impl ObjectPatch {
    pub fn rename(new_name: &str) -> Self {
        ObjectPatch {
            name: Some(new_name.to_string()),
            last_modified: None,
        }
    }

    pub fn touch(millis: i64) -> Self {
        ObjectPatch {
            name: None,
            last_modified: Some(millis),
        }
    }

    /// True when the patch would change nothing remotely.
    pub fn is_noop(&self) -> bool {
        self.name.is_none() && !self.last_modified.is_some_and(|t| t > 0)
    }
}

/// Result of an exact-name lookup inside a folder.
///
/// `Duplicated` is distinct from `Missing`: the store found more than one
/// object with that exact name, so the plain name does not identify any of
/// them. Callers treat it like a miss; the real files stay addressable
/// through their encoded virtual names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameLookup {
    Found(RemoteObject),
    Missing,
    Duplicated,
}

/// Metadata sent when creating or updating content remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub title: String,
    /// Modification time, epoch milliseconds
    pub modified: i64,
    pub parents: Vec<String>,
}

/// Response to a resumable-session initiation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInit {
    pub status: u16,
    /// Session URI for subsequent chunk uploads (present on 200)
    pub session_uri: Option<String>,
}

/// Response to a single chunk upload.
///
/// A success status carries the finalized remote object; 308 means the
/// range was accepted but the upload is not complete yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkStatus {
    pub status: u16,
    pub object: Option<RemoteObject>,
}

impl ChunkStatus {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_incomplete(&self) -> bool {
        self.status == 308
    }
}

/// Content-range declaration for one chunk of a resumable upload.
///
/// Renders as `bytes {first}-{last}/{total}` where the byte span collapses
/// to `*` for a zero-length finalize call and the total is `*` until the
/// cumulative size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// Cumulative bytes sent before this chunk
    pub offset: u64,
    /// Bytes carried by this chunk (may be 0 on finalize)
    pub len: u64,
    /// Total object size, once known
    pub total: Option<u64>,
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes ")?;
        if self.len == 0 {
            write!(f, "*")?;
        } else {
            write!(f, "{}-{}", self.offset, self.offset + self.len - 1)?;
        }
        match self.total {
            Some(total) => write!(f, "/{total}"),
            None => write!(f, "/*"),
        }
    }
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
