//! MIME type detection for outbound uploads.
//!
//! Sniffed once per transfer, from the first buffered bytes. Magic-byte
//! detection wins; the target filename's extension is the fallback.

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect a content type from leading file bytes plus the target filename.
pub fn detect_content_type(bytes: &[u8], file_name: &str) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    mime_guess::from_path(file_name)
        .first_raw()
        .map(str::to_string)
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}
