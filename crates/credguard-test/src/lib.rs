//! In-memory store, clock and salt implementations for tests. Not for production use.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use chrono::{DateTime, TimeZone, Utc};
use credguard_core::{Clock, CredentialRecord, CredentialStore, HistoryStore, PasswordHistoryEntry, StoreError};
use credguard_crypto::SaltSource;

/// [CredentialStore] over a serialized in-memory map, with failure injection.
///
/// Records are stored as JSON rather than as live values so tests also exercise the
/// serde path a real store would go through.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: tokio::sync::Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryCredentialStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with [StoreError::Unavailable] until turned
    /// off again.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_owned()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, subject: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.check_available()?;
        let records = self.records.lock().await;
        records
            .get(subject)
            .map(|json| serde_json::from_str(json).map_err(StoreError::from))
            .transpose()
    }

    async fn put(&self, record: CredentialRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let json = serde_json::to_string(&record)?;
        let mut records = self.records.lock().await;
        records.insert(record.subject, json);
        Ok(())
    }

    async fn delete(&self, subject: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = self.records.lock().await;
        records.remove(subject);
        Ok(())
    }

    async fn subjects(&self) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let records = self.records.lock().await;
        let mut subjects: Vec<String> = records.keys().cloned().collect();
        subjects.sort();
        Ok(subjects)
    }
}

/// [HistoryStore] over an in-memory map of per-subject entry lists.
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: tokio::sync::Mutex<HashMap<String, Vec<PasswordHistoryEntry>>>,
}

impl MemoryHistoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: PasswordHistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.entry(entry.subject.clone()).or_default().push(entry);
        Ok(())
    }

    async fn list_recent(
        &self,
        subject: &str,
        limit: usize,
    ) -> Result<Vec<PasswordHistoryEntry>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(subject)
            .map(|list| list.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn trim(&self, subject: &str, keep: usize) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if let Some(list) = entries.get_mut(subject) {
            let excess = list.len().saturating_sub(keep);
            list.drain(..excess);
        }
        Ok(())
    }
}

/// Manually advanced [Clock]. Starts at a fixed instant so lockout-window tests are
/// deterministic.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// A clock frozen at the given instant.
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock { now: Mutex::new(now) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now = *now + by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        FixedClock::new(start)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// Deterministic [SaltSource] producing a distinct salt per call.
#[derive(Default)]
pub struct SequenceSaltSource {
    counter: AtomicU64,
}

impl SequenceSaltSource {
    /// A source starting from salt zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaltSource for SequenceSaltSource {
    fn fill(&self, buf: &mut [u8]) {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        for (i, byte) in buf.iter_mut().enumerate() {
            // Mix the counter into every byte so consecutive salts differ everywhere,
            // not just in the tail.
            *byte = (n as u8).wrapping_add(i as u8).wrapping_mul(31).wrapping_add(n as u8);
        }
    }
}
