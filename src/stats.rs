use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected while a dataset is iterated
#[derive(Default, Debug)]
pub struct ExtractionStats {
    pub pages_read: AtomicU64,
    pub not_person: AtomicU64,
    pub failed: AtomicU64,
    pub filtered_out: AtomicU64,
    pub accepted: AtomicU64,
    pub redirects: AtomicU64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_pages(&self) {
        self.pages_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_not_person(&self) {
        self.not_person.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_filtered(&self) {
        self.filtered_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Redirects are counted by the reader; this mirrors its running total.
    pub fn set_redirects(&self, total: u64) {
        self.redirects.store(total, Ordering::Relaxed);
    }

    pub fn pages(&self) -> u64 {
        self.pages_read.load(Ordering::Relaxed)
    }

    pub fn not_persons(&self) -> u64 {
        self.not_person.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn filtered(&self) -> u64 {
        self.filtered_out.load(Ordering::Relaxed)
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn redirects_skipped(&self) -> u64 {
        self.redirects.load(Ordering::Relaxed)
    }
}
