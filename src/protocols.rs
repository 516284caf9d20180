//! Registry of playback schemes the host can handle.
//!
//! The host announces protocol handlers as they come and go; each handler
//! contributes a set of schemes (`http`, `rtmp`, ...). The registry keeps
//! the union of everything currently registered. Schemes are reference
//! counted so that removing one handler does not revoke a scheme another
//! handler still provides.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Shared, thread-safe set of supported schemes.
///
/// Cloning yields another handle to the same set.
#[derive(Debug, Clone, Default)]
pub struct ProtocolSet {
    schemes: Arc<Mutex<HashMap<String, usize>>>,
}

impl ProtocolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set pre-populated with one handler's schemes.
    pub fn with_schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = Self::new();
        set.add_protocol(schemes);
        set
    }

    /// Register a handler's schemes.
    pub fn add_protocol<I, S>(&self, schemes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.lock();
        for scheme in schemes {
            let scheme = scheme.as_ref().to_ascii_lowercase();
            debug!("Adding supported protocol {}", scheme);
            *guard.entry(scheme).or_insert(0) += 1;
        }
    }

    /// Unregister a handler's schemes.
    pub fn remove_protocol<I, S>(&self, schemes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.lock();
        for scheme in schemes {
            let scheme = scheme.as_ref().to_ascii_lowercase();
            if let Some(count) = guard.get_mut(&scheme) {
                *count -= 1;
                if *count == 0 {
                    debug!("Removing supported protocol {}", scheme);
                    guard.remove(&scheme);
                }
            }
        }
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.lock().contains_key(&scheme.to_ascii_lowercase())
    }

    /// Sorted list of the currently supported schemes.
    pub fn snapshot(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.lock().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        // Every update leaves the map consistent; poisoning is ignored.
        self.schemes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_handlers() {
        let set = ProtocolSet::new();
        set.add_protocol(["http", "https"]);
        set.add_protocol(["rtmp"]);
        assert_eq!(set.snapshot(), ["http", "https", "rtmp"]);
    }

    #[test]
    fn removing_one_handler_keeps_shared_scheme() {
        let set = ProtocolSet::new();
        set.add_protocol(["http", "rtmp"]);
        set.add_protocol(["http"]);
        set.remove_protocol(["http", "rtmp"]);

        assert!(set.contains("http"));
        assert!(!set.contains("rtmp"));
    }

    #[test]
    fn schemes_are_case_insensitive() {
        let set = ProtocolSet::with_schemes(["RTMP"]);
        assert!(set.contains("rtmp"));
        assert!(set.contains("Rtmp"));
    }

    #[test]
    fn removing_unknown_scheme_is_a_no_op() {
        let set = ProtocolSet::with_schemes(["http"]);
        set.remove_protocol(["mms"]);
        assert_eq!(set.snapshot(), ["http"]);
    }

    #[test]
    fn clones_share_state_across_threads() {
        let set = ProtocolSet::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let set = set.clone();
                std::thread::spawn(move || set.add_protocol([format!("p{i}")]))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(set.snapshot().len(), 4);
    }
}
