//! Endpoint storage shared between a provider, the validator and callers.
//!
//! [`EndpointTable`] is an arena: one owned, indexable `Vec<Endpoint>` behind
//! a single mutex. Handles are cheap clones of the same storage, so a
//! mutation made through one handle is visible through all of them.
//! Validator tasks address entries by index.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use nonempty::NonEmpty;

use crate::model::Endpoint;
use crate::probe::ProbeOutcome;

/// Shared handle to a provider's endpoints.
#[derive(Debug, Clone)]
pub struct EndpointTable {
    entries: Arc<Mutex<Vec<Endpoint>>>,
}

impl EndpointTable {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(endpoints)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every entry. Only consistent once no validation is running.
    pub fn snapshot(&self) -> Vec<Endpoint> {
        self.lock().clone()
    }

    pub fn get(&self, index: usize) -> Option<Endpoint> {
        self.lock().get(index).cloned()
    }

    /// First endpoint declared with `path`.
    pub fn find(&self, path: &str) -> Option<Endpoint> {
        self.lock().iter().find(|e| e.path() == path).cloned()
    }

    /// Run `f` over the entries while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&[Endpoint]) -> R) -> R {
        f(&self.lock())
    }

    /// Whether both handles point at the same storage.
    pub fn ptr_eq(&self, other: &EndpointTable) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Write a probe outcome into entry `index`.
    ///
    /// This is the only path through which endpoint health changes.
    pub(crate) fn record(&self, index: usize, outcome: ProbeOutcome) {
        let mut entries = self.lock();
        match entries.get_mut(index) {
            Some(endpoint) => endpoint.record(outcome.latency, outcome.result),
            None => tracing::warn!(index, "probe outcome for unknown endpoint index dropped"),
        }
    }

    /// Replace the critical flags: exactly the endpoints whose path is in
    /// `paths` become critical.
    pub(crate) fn set_critical_paths(&self, paths: &[String]) {
        for endpoint in self.lock().iter_mut() {
            let critical = paths.iter().any(|p| p == endpoint.path());
            endpoint.set_critical(critical);
        }
    }

    /// Mark every entry still `unknown` as failed. Used after the join so a
    /// lost probe can never leave an entry behind.
    pub(crate) fn fail_unrecorded(&self, error: &str) {
        for endpoint in self.lock().iter_mut() {
            if endpoint.status() == crate::model::EndpointStatus::Unknown {
                endpoint.record(Duration::ZERO, Err(error.to_string()));
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Endpoint>> {
        // An entry write cannot leave the vector half-updated, so a poisoned
        // lock still guards consistent data.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<NonEmpty<Endpoint>> for EndpointTable {
    fn from(endpoints: NonEmpty<Endpoint>) -> Self {
        Self::new(endpoints.into())
    }
}

/// Lazily built, provider-owned endpoint table.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    cell: OnceLock<EndpointTable>,
    critical_override: Option<Vec<String>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that replaces the vendor's critical flags with `paths`
    /// when the table is first built.
    pub fn with_critical_override(paths: Option<Vec<String>>) -> Self {
        Self {
            cell: OnceLock::new(),
            critical_override: paths,
        }
    }

    /// Return the cached table, building it with `build` on first use.
    pub fn get_or_init(&self, build: impl FnOnce() -> NonEmpty<Endpoint>) -> EndpointTable {
        self.cell
            .get_or_init(|| {
                let table = EndpointTable::from(build());
                if let Some(paths) = &self.critical_override {
                    table.set_critical_paths(paths);
                }
                tracing::debug!(endpoints = table.len(), "endpoint table initialized");
                table
            })
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EndpointStatus;
    use nonempty::nonempty;

    fn build() -> NonEmpty<Endpoint> {
        nonempty![
            Endpoint::get("/models", "List models").critical(),
            Endpoint::post("/chat/completions", "Chat")
        ]
    }

    #[test]
    fn registry_hands_out_the_same_storage() {
        let registry = EndpointRegistry::new();
        assert!(!registry.is_initialized());

        let first = registry.get_or_init(build);
        let second = registry.get_or_init(|| unreachable!("built twice"));
        assert!(first.ptr_eq(&second));

        first.record(
            1,
            ProbeOutcome {
                latency: Duration::from_millis(9),
                result: Ok(()),
            },
        );
        let seen = second.get(1).unwrap();
        assert_eq!(seen.status(), EndpointStatus::Working);
        assert_eq!(seen.latency(), Duration::from_millis(9));
    }

    #[test]
    fn critical_override_replaces_vendor_flags() {
        let registry =
            EndpointRegistry::with_critical_override(Some(vec!["/chat/completions".to_string()]));
        let table = registry.get_or_init(build);

        assert!(!table.find("/models").unwrap().is_critical());
        assert!(table.find("/chat/completions").unwrap().is_critical());
    }

    #[test]
    fn fail_unrecorded_only_touches_unknown_entries() {
        let table = EndpointTable::from(build());
        table.record(
            0,
            ProbeOutcome {
                latency: Duration::from_millis(1),
                result: Ok(()),
            },
        );
        table.fail_unrecorded("lost");

        let entries = table.snapshot();
        assert_eq!(entries[0].status(), EndpointStatus::Working);
        assert_eq!(entries[1].status(), EndpointStatus::Failed);
        assert_eq!(entries[1].error(), "lost");
    }
}
