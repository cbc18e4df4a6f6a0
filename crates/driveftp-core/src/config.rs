use serde::{Deserialize, Serialize};

/// Default illegal-character pattern: path separator, ASCII control
/// characters, backtick, `?`, `*`, backslash, `<`, `>`, `|`, double quote,
/// colon. Matches are replaced with `_` when building virtual names.
pub const DEFAULT_ILLEGAL_CHARS: &str = r#"/|[\x00-\x1F\x7F]|`|\?|\*|\\|<|>|\||"|:"#;

/// Top-level gateway configuration (loaded from driveftp.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub ftp: FtpConfig,
    pub namespace: NamespaceConfig,
    pub throttle: ThrottleConfig,
    pub upload: UploadConfig,
}

/// Settings consumed by the surrounding FTP engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FtpConfig {
    /// Control-connection listen port (default: 1821)
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Allow anonymous logins (default: false)
    pub anonymous_enabled: bool,
    /// Idle timeout before a session is dropped, seconds
    pub max_idle_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Regex of characters replaced with `_` in virtual names
    pub illegal_chars: String,
    /// Compare sibling names case-insensitively (Windows-style clients)
    pub case_insensitive: bool,
    /// Metadata id of the namespace root (default: "root")
    pub root_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Burst window in seconds (default: 10)
    pub window_secs: u64,
    /// Tracked folders before LRU eviction (default: 10)
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Initial chunk size in KiB; rounded to a 256 KiB multiple (default: 512)
    pub initial_chunk_kib: u64,
    /// Adaptive sizing ceiling in MiB (default: 50)
    pub max_chunk_mib: u64,
    /// Throughput target: seconds one chunk should take (default: 3)
    pub target_chunk_secs: u64,
    /// Resize only when the proposed size differs by more than this percent
    pub resize_tolerance_pct: u8,
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            port: 1821,
            user: "user".into(),
            pass: "user".into(),
            anonymous_enabled: false,
            max_idle_secs: 300,
        }
    }
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            illegal_chars: DEFAULT_ILLEGAL_CHARS.into(),
            case_insensitive: cfg!(windows),
            root_id: "root".into(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            window_secs: 10,
            capacity: 10,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            initial_chunk_kib: 512,
            max_chunk_mib: 50,
            target_chunk_secs: 3,
            resize_tolerance_pct: 20,
        }
    }
}
