//! Filename sanitizing and the duplicate-name token scheme.
//!
//! Duplicate or illegal names are made addressable by embedding the object
//! id into the filename: `report.txt` with id `X` becomes
//! `report__ID__X__ID__.txt`. The token is reserved; clients should never
//! use it in their own filenames.

use regex::Regex;

use driveftp_core::config::NamespaceConfig;
use driveftp_core::{GatewayError, GatewayResult};

/// Delimiter injected around the object id in encoded names.
pub const DUP_TOKEN: &str = "__ID__";

/// Remote object ids are fixed-length in this deployment.
pub const ID_LEN: usize = 28;

/// Compiled sanitize/encode/decode rules for one namespace.
pub struct NameCodec {
    illegal: Regex,
    encoded: Regex,
}

impl NameCodec {
    /// Compile a codec over the given illegal-character pattern.
    pub fn new(illegal_pattern: &str) -> GatewayResult<Self> {
        let illegal = Regex::new(illegal_pattern)
            .map_err(|e| GatewayError::Config(format!("bad illegal-char pattern: {e}")))?;
        let token = regex::escape(DUP_TOKEN);
        let encoded = Regex::new(&format!("^(.*){token}(.{{{ID_LEN}}}){token}(.*)$"))
            .map_err(|e| GatewayError::Config(format!("bad encoded-name pattern: {e}")))?;
        Ok(NameCodec { illegal, encoded })
    }

    pub fn from_config(cfg: &NamespaceConfig) -> GatewayResult<Self> {
        NameCodec::new(&cfg.illegal_chars)
    }

    /// Replace every illegal character with `_`.
    pub fn sanitize(&self, name: &str) -> String {
        self.illegal.replace_all(name, "_").into_owned()
    }

    /// Inject `id` between the basename and the extension (the extension
    /// keeps its leading dot, so decode is plain concatenation).
    pub fn encode(&self, name: &str, id: &str) -> String {
        let (base, ext) = match name.rfind('.') {
            Some(pos) => name.split_at(pos),
            None => (name, ""),
        };
        format!("{base}{DUP_TOKEN}{id}{DUP_TOKEN}{ext}")
    }

    /// Strip the token scheme from a name, if present. Returns the plain
    /// name and the embedded id. Purely syntactic; the id is not checked
    /// against the store.
    pub fn decode(&self, name: &str) -> (String, Option<String>) {
        if name.contains(DUP_TOKEN) {
            if let Some(caps) = self.encoded.captures(name) {
                let plain = format!("{}{}", &caps[1], &caps[3]);
                return (plain, Some(caps[2].to_string()));
            }
        }
        (name.to_string(), None)
    }
}
