//! The MFMT protocol command: set a target's modification time.
//!
//! Argument shape is `<YYYYMMDDHHMMSS> <path>`. The outcome maps onto the
//! standard FTP replies (501 syntax, 550 missing, 450 not applied, 213
//! applied); the command engine owns the actual wire format of those
//! replies.

use chrono::{NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use driveftp_core::GatewayResult;

use crate::view::FileSystemView;

const FTP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// What the command engine should reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfmtOutcome {
    /// Missing or malformed argument (reply 501)
    InvalidSyntax,
    /// The path does not resolve to an existing object (reply 550)
    Missing(String),
    /// The remote refused the patch (reply 450)
    Rejected(String),
    /// Time applied (reply 213, `ModifyTime=<timestamp>; <path>`)
    Applied { timestamp: String, path: String },
}

/// Parse an FTP timestamp (UTC, second precision) into epoch milliseconds.
pub fn parse_ftp_timestamp(raw: &str) -> Option<i64> {
    let parsed = NaiveDateTime::parse_from_str(raw, FTP_TIMESTAMP_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&parsed).timestamp_millis())
}

/// Handle one MFMT invocation. Directories are valid targets, not just
/// files: clients use this to restore folder timestamps after a mirror.
pub async fn modify_time(
    view: &dyn FileSystemView,
    argument: &str,
) -> GatewayResult<MfmtOutcome> {
    let argument = argument.trim();
    if argument.is_empty() {
        return Ok(MfmtOutcome::InvalidSyntax);
    }

    let Some((raw_timestamp, raw_path)) = argument.split_once(' ') else {
        return Ok(MfmtOutcome::InvalidSyntax);
    };
    let raw_timestamp = raw_timestamp.trim();
    let raw_path = raw_path.trim();

    let Some(millis) = parse_ftp_timestamp(raw_timestamp) else {
        debug!(timestamp = raw_timestamp, "unparseable MFMT timestamp");
        return Ok(MfmtOutcome::InvalidSyntax);
    };

    let node = match view.get_file(raw_path).await {
        Ok(Some(node)) => node,
        Ok(None) => return Ok(MfmtOutcome::Missing(raw_path.to_string())),
        Err(e) => {
            debug!(path = raw_path, error = %e, "MFMT target resolution failed");
            return Ok(MfmtOutcome::Missing(raw_path.to_string()));
        }
    };
    if !node.exists() {
        return Ok(MfmtOutcome::Missing(raw_path.to_string()));
    }

    if !view.set_modified(&node, millis).await? {
        return Ok(MfmtOutcome::Rejected(raw_path.to_string()));
    }

    Ok(MfmtOutcome::Applied {
        timestamp: raw_timestamp.to_string(),
        path: raw_path.to_string(),
    })
}
