//! Shared fixtures: an in-memory metadata store and recording
//! collaborators.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use driveftp_core::config::GatewayConfig;
use driveftp_core::remote::{ByteReader, ChangeNotifier, DriveClient, MetadataStore};
use driveftp_core::types::{
    ChunkStatus, ContentRange, NameLookup, ObjectPatch, RemoteObject, SessionInit, UploadMetadata,
};
use driveftp_core::{GatewayError, GatewayResult};
use driveftp_vfs::{Gateway, NameCodec, SessionView};

pub const ROOT_ID: &str = "root";

/// Pad a short seed up to the fixed remote id length.
pub fn id28(seed: &str) -> String {
    let mut id = seed.to_string();
    while id.len() < 28 {
        id.push('x');
    }
    id
}

pub fn folder(id: &str, name: &str, parent: &str) -> RemoteObject {
    let mut o = file(id, name, parent);
    o.is_directory = true;
    o
}

pub fn file(id: &str, name: &str, parent: &str) -> RemoteObject {
    let mut o = RemoteObject::prospective(parent, name);
    o.id = id.to_string();
    o.exists = true;
    o.size = 42;
    o.last_modified = 1_700_000_000_000;
    o
}

pub fn root_object() -> RemoteObject {
    let mut o = RemoteObject::prospective("", "root");
    o.id = ROOT_ID.to_string();
    o.is_directory = true;
    o.exists = true;
    o.parents.clear();
    o
}

/// Vec-backed store: `children` preserves insertion order, which the
/// listing pass is required not to re-sort.
pub struct InMemoryStore {
    objects: Mutex<Vec<RemoteObject>>,
}

impl InMemoryStore {
    pub fn with_objects(objects: Vec<RemoteObject>) -> Self {
        InMemoryStore {
            objects: Mutex::new(objects),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.lock().unwrap().iter().any(|o| o.id == id)
    }
}

#[async_trait]
impl MetadataStore for InMemoryStore {
    async fn object_by_id(&self, id: &str) -> GatewayResult<Option<RemoteObject>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn object_by_name(&self, parent_id: &str, name: &str) -> GatewayResult<NameLookup> {
        let objects = self.objects.lock().unwrap();
        let mut matches = objects
            .iter()
            .filter(|o| o.parents.contains(parent_id) && o.name == name);
        match (matches.next(), matches.next()) {
            (None, _) => Ok(NameLookup::Missing),
            (Some(one), None) => Ok(NameLookup::Found(one.clone())),
            (Some(_), Some(_)) => Ok(NameLookup::Duplicated),
        }
    }

    async fn children(&self, folder_id: &str) -> GatewayResult<Vec<RemoteObject>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.parents.contains(folder_id))
            .cloned()
            .collect())
    }

    async fn evict(&self, id: &str) {
        self.objects.lock().unwrap().retain(|o| o.id != id);
    }
}

/// Drive client that records mutations and echoes patches back.
pub struct RecordingDrive {
    pub refuse_patches: bool,
    pub patches: Mutex<Vec<(String, ObjectPatch)>>,
    pub trashed: Mutex<Vec<String>>,
    pub mkdirs: Mutex<Vec<(String, String)>>,
}

impl RecordingDrive {
    pub fn new() -> Self {
        RecordingDrive {
            refuse_patches: false,
            patches: Mutex::new(Vec::new()),
            trashed: Mutex::new(Vec::new()),
            mkdirs: Mutex::new(Vec::new()),
        }
    }

    pub fn refusing_patches() -> Self {
        RecordingDrive {
            refuse_patches: true,
            ..RecordingDrive::new()
        }
    }
}

#[async_trait]
impl DriveClient for RecordingDrive {
    async fn patch(&self, id: &str, patch: &ObjectPatch) -> GatewayResult<Option<RemoteObject>> {
        self.patches
            .lock()
            .unwrap()
            .push((id.to_string(), patch.clone()));
        if self.refuse_patches {
            return Ok(None);
        }
        let mut updated = file(id, patch.name.as_deref().unwrap_or("patched"), "unused");
        if let Some(t) = patch.last_modified {
            updated.last_modified = t;
        }
        Ok(Some(updated))
    }

    async fn trash(&self, id: &str) -> GatewayResult<bool> {
        self.trashed.lock().unwrap().push(id.to_string());
        Ok(true)
    }

    async fn mkdir(&self, parent_id: &str, name: &str) -> GatewayResult<Option<RemoteObject>> {
        self.mkdirs
            .lock()
            .unwrap()
            .push((parent_id.to_string(), name.to_string()));
        Ok(Some(folder(&id28("newdir"), name, parent_id)))
    }

    async fn open_reader(&self, _object: &RemoteObject, _offset: u64) -> GatewayResult<ByteReader> {
        Err(GatewayError::Remote("open_reader not scripted".into()))
    }

    async fn commit(
        &self,
        _existing_id: Option<&str>,
        _meta: &UploadMetadata,
        _content: Option<(&str, &[u8])>,
    ) -> GatewayResult<RemoteObject> {
        Err(GatewayError::Remote("commit not scripted".into()))
    }

    async fn begin_resumable(
        &self,
        _existing_id: Option<&str>,
        _meta: &UploadMetadata,
        _content_type: &str,
    ) -> GatewayResult<SessionInit> {
        Err(GatewayError::Remote("begin_resumable not scripted".into()))
    }

    async fn upload_chunk(
        &self,
        _session_uri: &str,
        _content_type: &str,
        _body: &[u8],
        _range: &ContentRange,
    ) -> GatewayResult<ChunkStatus> {
        Err(GatewayError::Remote("upload_chunk not scripted".into()))
    }
}

/// Notifier that records refresh signals and always succeeds.
pub struct RecordingNotifier {
    pub folders: Mutex<Vec<String>>,
    pub objects: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        RecordingNotifier {
            folders: Mutex::new(Vec::new()),
            objects: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn refresh_folder(&self, folder_id: &str) -> GatewayResult<()> {
        self.folders.lock().unwrap().push(folder_id.to_string());
        Ok(())
    }

    async fn refresh_object(&self, id: &str) -> GatewayResult<()> {
        self.objects.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub drive: Arc<RecordingDrive>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<Gateway>,
    pub view: SessionView,
}

/// Wire a session view over the given objects (the root object is added
/// automatically).
pub fn fixture(objects: Vec<RemoteObject>) -> Fixture {
    fixture_with(objects, RecordingDrive::new(), false)
}

pub fn fixture_with(
    mut objects: Vec<RemoteObject>,
    drive: RecordingDrive,
    case_insensitive: bool,
) -> Fixture {
    objects.insert(0, root_object());
    let config = GatewayConfig::default();
    let store = Arc::new(InMemoryStore::with_objects(objects));
    let drive = Arc::new(drive);
    let notifier = Arc::new(RecordingNotifier::new());
    let gateway = Arc::new(Gateway::new(
        store.clone(),
        drive.clone(),
        notifier.clone(),
        &config,
    ));
    let codec = Arc::new(NameCodec::from_config(&config.namespace).unwrap());
    let view = SessionView::new(
        gateway.clone(),
        codec,
        ROOT_ID.to_string(),
        case_insensitive,
    );
    Fixture {
        store,
        drive,
        notifier,
        gateway,
        view,
    }
}
