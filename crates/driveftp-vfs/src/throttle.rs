//! Burst-listing detector.
//!
//! FTP clients poll: a user sitting in a folder can trigger the same LIST
//! several times a second while the background synchronizer is still
//! filling the cache. Every third listing of one folder inside the window
//! forces a synchronous refresh before the listing is served. The counter
//! resets on every third call whether or not the window check fired, so
//! this is a repeating three-request detector, not a sliding window.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::info;

use driveftp_core::config::ThrottleConfig;

struct Tracker {
    last_seen: Instant,
    count: u32,
}

/// Fixed-capacity, access-ordered map from folder id to request tracker.
/// The least recently listed folder is evicted when full.
struct RecencyMap {
    entries: Vec<(String, Tracker)>,
    capacity: usize,
}

impl RecencyMap {
    /// Fetch-or-create the tracker for `key`, moving it to the back.
    fn touch(&mut self, key: &str) -> &mut Tracker {
        if let Some(pos) = self.entries.iter().position(|(k, _)| k == key) {
            let entry = self.entries.remove(pos);
            self.entries.push(entry);
        } else {
            self.entries.push((
                key.to_string(),
                Tracker {
                    last_seen: Instant::now(),
                    count: 0,
                },
            ));
            if self.entries.len() > self.capacity {
                self.entries.remove(0);
            }
        }
        let last = self.entries.len() - 1;
        &mut self.entries[last].1
    }
}

/// Shared across all sessions listing folders concurrently; one critical
/// section covers the whole read-increment-reset sequence.
pub struct RequestThrottle {
    inner: Mutex<RecencyMap>,
    window: Duration,
}

impl RequestThrottle {
    pub fn new(window: Duration, capacity: usize) -> Self {
        RequestThrottle {
            inner: Mutex::new(RecencyMap {
                entries: Vec::new(),
                capacity: capacity.max(1),
            }),
            window,
        }
    }

    pub fn from_config(cfg: &ThrottleConfig) -> Self {
        RequestThrottle::new(Duration::from_secs(cfg.window_secs), cfg.capacity)
    }

    /// Record one listing request for `folder_id` and decide whether the
    /// caller should refresh the folder synchronously first. Side-effecting
    /// on every call, not a pure predicate.
    pub fn should_force_refresh(&self, folder_id: &str) -> bool {
        let mut map = self.inner.lock().unwrap();
        let entry = map.touch(folder_id);
        entry.count += 1;
        if entry.count > 2 {
            // evaluated against the timestamp recorded before this reset
            let force = entry.last_seen.elapsed() < self.window;
            entry.count = 0;
            entry.last_seen = Instant::now();
            if force {
                info!(folder_id, "burst listing detected, forcing refresh");
            }
            return force;
        }
        false
    }
}
