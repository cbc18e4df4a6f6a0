//! driveftp-upload: resumable upload stream for the remote drive API
//!
//! One [`UploadSession`] backs one open FTP write transfer. Bytes are
//! buffered up to the current chunk size; full buffers are pushed through
//! the drive's resumable upload protocol, and the chunk size self-tunes to
//! the observed throughput. Files smaller than one chunk bypass the
//! session protocol entirely with a single create-or-update call.

pub mod session;
pub mod sniff;

pub use session::{UploadSession, UploadTuning, CHUNK_UNIT};
pub use sniff::detect_content_type;
