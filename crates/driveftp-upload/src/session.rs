//! Per-transfer upload state machine.
//!
//! States: empty → buffering → {direct commit | session init → chunk
//! uploads} → complete. Chunk transmission happens inline in the writer's
//! call path; `write` suspends until the chunk round-trip finishes. A 308
//! response advances the stream, a success response finalizes it, anything
//! else aborts the transfer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use driveftp_core::config::UploadConfig;
use driveftp_core::remote::DriveClient;
use driveftp_core::types::{now_millis, ContentRange, RemoteObject, UploadMetadata};
use driveftp_core::{GatewayError, GatewayResult};

use crate::sniff;

/// Chunk sizes are always a multiple of this (the drive API requires it).
pub const CHUNK_UNIT: u64 = 256 * 1024;

const MIN_CHUNK: u64 = CHUNK_UNIT;

/// Tuning knobs for buffering and adaptive chunk sizing.
#[derive(Debug, Clone)]
pub struct UploadTuning {
    /// Starting chunk size in bytes (256 KiB multiple)
    pub initial_chunk: u64,
    /// Adaptive ceiling in bytes (256 KiB multiple)
    pub max_chunk: u64,
    /// Seconds one chunk should ideally take at observed throughput
    pub target_chunk_secs: u64,
    /// Skip resizes smaller than this fraction of the current size
    pub resize_tolerance_pct: u8,
}

impl Default for UploadTuning {
    fn default() -> Self {
        Self {
            initial_chunk: 2 * CHUNK_UNIT,
            max_chunk: 200 * CHUNK_UNIT, // 50 MiB
            target_chunk_secs: 3,
            resize_tolerance_pct: 20,
        }
    }
}

impl UploadTuning {
    /// Build tuning from config, rounding sizes down to 256 KiB multiples.
    pub fn from_config(cfg: &UploadConfig) -> Self {
        let initial = round_to_unit(cfg.initial_chunk_kib * 1024);
        let max = round_to_unit(cfg.max_chunk_mib * 1024 * 1024).max(initial);
        Self {
            initial_chunk: initial,
            max_chunk: max,
            target_chunk_secs: cfg.target_chunk_secs.max(1),
            resize_tolerance_pct: cfg.resize_tolerance_pct,
        }
    }
}

fn round_to_unit(bytes: u64) -> u64 {
    (bytes / CHUNK_UNIT).max(1) * CHUNK_UNIT
}

/// One outbound transfer to the remote drive.
///
/// Owned exclusively by the open write transfer; discarded when the
/// transfer closes. Once finalized, further `write`/`close` calls are
/// no-ops.
pub struct UploadSession {
    client: Arc<dyn DriveClient>,
    target: RemoteObject,
    tuning: UploadTuning,
    buf: Vec<u8>,
    chunk_size: u64,
    total_sent: u64,
    content_type: Option<String>,
    session_uri: Option<String>,
    uploaded: Option<RemoteObject>,
}

impl std::fmt::Debug for UploadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSession")
            .field("target", &self.target)
            .field("tuning", &self.tuning)
            .field("buf_len", &self.buf.len())
            .field("chunk_size", &self.chunk_size)
            .field("total_sent", &self.total_sent)
            .field("content_type", &self.content_type)
            .field("session_uri", &self.session_uri)
            .field("uploaded", &self.uploaded)
            .finish()
    }
}

impl UploadSession {
    /// Open an upload for `target` (prospective or existing, never a
    /// directory).
    pub fn new(
        client: Arc<dyn DriveClient>,
        target: RemoteObject,
        tuning: UploadTuning,
    ) -> GatewayResult<Self> {
        if target.is_directory {
            return Err(GatewayError::InvalidArgument(
                "cannot open an output stream on a directory".into(),
            ));
        }
        let chunk_size = round_to_unit(tuning.initial_chunk);
        Ok(UploadSession {
            client,
            target,
            tuning,
            buf: Vec::with_capacity(chunk_size as usize),
            chunk_size,
            total_sent: 0,
            content_type: None,
            session_uri: None,
            uploaded: None,
        })
    }

    /// The finalized remote object, once the upload completed.
    pub fn finalized(&self) -> Option<&RemoteObject> {
        self.uploaded.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.uploaded.is_some()
    }

    /// Current chunk-size target in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Append bytes to the transfer. Suspends whenever the buffer reaches
    /// the chunk-size target, until that chunk has been accepted remotely.
    pub async fn write(&mut self, mut data: &[u8]) -> GatewayResult<()> {
        if self.uploaded.is_some() {
            return Ok(());
        }
        while !data.is_empty() {
            let room = (self.chunk_size as usize).saturating_sub(self.buf.len());
            let take = room.min(data.len());
            self.buf.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.buf.len() as u64 == self.chunk_size {
                self.handle_chunk().await?;
            }
        }
        Ok(())
    }

    /// Finish the transfer with whatever is buffered (possibly nothing).
    pub async fn close(&mut self) -> GatewayResult<()> {
        self.handle_chunk().await
    }

    async fn handle_chunk(&mut self) -> GatewayResult<()> {
        if self.uploaded.is_some() {
            return Ok(());
        }
        if self.total_sent == 0 {
            // First chunk: sniff the content type once, from the buffered
            // head plus the target filename.
            if self.content_type.is_none() {
                let detected = sniff::detect_content_type(&self.buf, &self.target.name);
                debug!(content_type = %detected, name = %self.target.name, "detected MIME type");
                self.content_type = Some(detected);
            }
            if (self.buf.len() as u64) < self.chunk_size {
                self.direct_commit().await
            } else {
                self.ensure_session().await?;
                self.send_chunk().await
            }
        } else {
            self.send_chunk().await
        }
    }

    /// The whole file fits in one buffer: a single create-or-update call
    /// carrying the full content (or none of it, for an empty file).
    async fn direct_commit(&mut self) -> GatewayResult<()> {
        let meta = self.build_metadata();
        let content_type = self.current_content_type();
        let content = if self.buf.is_empty() {
            None
        } else {
            Some((content_type.as_str(), self.buf.as_slice()))
        };
        let object = self
            .client
            .commit(self.existing_id(), &meta, content)
            .await?;
        info!(
            name = %self.target.name,
            bytes = self.buf.len(),
            "uploaded without resumable session"
        );
        self.total_sent += self.buf.len() as u64;
        self.buf.clear();
        self.uploaded = Some(object);
        Ok(())
    }

    async fn ensure_session(&mut self) -> GatewayResult<()> {
        if self.session_uri.is_some() {
            return Ok(());
        }
        let meta = self.build_metadata();
        let content_type = self.current_content_type();
        let init = self
            .client
            .begin_resumable(self.existing_id(), &meta, &content_type)
            .await?;
        if init.status != 200 {
            return Err(GatewayError::UploadProtocol(format!(
                "resumable session init failed with status {}",
                init.status
            )));
        }
        let uri = init.session_uri.ok_or_else(|| {
            GatewayError::UploadProtocol("resumable session init returned no session URI".into())
        })?;
        debug!(uri = %uri, "resumable upload session created");
        self.session_uri = Some(uri);
        Ok(())
    }

    async fn send_chunk(&mut self) -> GatewayResult<()> {
        let uri = self.session_uri.clone().ok_or_else(|| {
            GatewayError::UploadProtocol("chunk upload attempted without a session".into())
        })?;
        let sent = self.buf.len() as u64;
        let is_last = sent == 0 || sent < self.chunk_size;
        let range = ContentRange {
            offset: self.total_sent,
            len: sent,
            total: is_last.then_some(self.total_sent + sent),
        };
        let content_type = self.current_content_type();

        let started = Instant::now();
        let reply = self
            .client
            .upload_chunk(&uri, &content_type, &self.buf, &range)
            .await?;
        let elapsed = started.elapsed();

        debug!(
            status = reply.status,
            offset = self.total_sent,
            len = sent,
            "uploaded chunk"
        );

        if reply.is_success() {
            let object = reply.object.ok_or_else(|| {
                GatewayError::UploadProtocol(
                    "chunk upload succeeded but carried no finalized object".into(),
                )
            })?;
            self.uploaded = Some(object);
        } else if !reply.is_incomplete() {
            return Err(GatewayError::UploadProtocol(format!(
                "chunk upload failed with status {}",
                reply.status
            )));
        }

        let had_baseline = self.total_sent > 0;
        self.total_sent += sent;
        self.buf.clear();

        // Retune only after a full-size chunk; the session's first chunk
        // only seeds the timing baseline.
        if sent == self.chunk_size && had_baseline && self.uploaded.is_none() {
            self.maybe_resize(sent, elapsed);
        }
        Ok(())
    }

    fn maybe_resize(&mut self, sent: u64, elapsed: Duration) {
        let proposed = propose_chunk_size(
            sent,
            elapsed,
            self.tuning.target_chunk_secs,
            self.tuning.max_chunk,
        );
        let current = self.chunk_size;
        let delta = current.abs_diff(proposed) as f64 / current as f64;
        if delta > f64::from(self.tuning.resize_tolerance_pct) / 100.0 {
            info!(
                from = current,
                to = proposed,
                elapsed_ms = elapsed.as_millis() as u64,
                "retuning upload chunk size"
            );
            self.chunk_size = proposed;
            self.buf.reserve(proposed as usize);
        }
    }

    fn existing_id(&self) -> Option<&str> {
        self.target.exists.then_some(self.target.id.as_str())
    }

    fn current_content_type(&self) -> String {
        self.content_type
            .clone()
            .unwrap_or_else(|| sniff::OCTET_STREAM.to_string())
    }

    /// Title, modification time (defaulting to now), and exactly one parent
    /// source: the target's parent-id set.
    fn build_metadata(&self) -> UploadMetadata {
        let modified = if self.target.last_modified != 0 {
            self.target.last_modified
        } else {
            now_millis()
        };
        let parents: Vec<String> = self.target.parents.iter().cloned().collect();
        if parents.is_empty() {
            warn!(name = %self.target.name, "upload target has no parent folder");
        }
        UploadMetadata {
            title: self.target.name.clone(),
            modified,
            parents,
        }
    }
}

/// Chunk size that would take roughly `target_secs` at the throughput just
/// observed, in 256 KiB steps, clamped to [256 KiB, `max_chunk`].
fn propose_chunk_size(sent: u64, elapsed: Duration, target_secs: u64, max_chunk: u64) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return max_chunk;
    }
    let throughput = sent as f64 / secs;
    let projected = throughput * target_secs as f64;
    let stepped = ((projected / CHUNK_UNIT as f64).round() as u64) * CHUNK_UNIT;
    stepped.clamp(MIN_CHUNK, max_chunk)
}
