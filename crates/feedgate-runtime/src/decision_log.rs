#![forbid(unsafe_code)]

//! JSONL decision log for settle/reveal orchestration.
//!
//! Every decision the orchestrator takes for a cycle (arming timers,
//! settling, forcing, revealing, rejecting) can be captured as one JSONL
//! line for offline inspection. Stale-callback drops are deliberately not
//! logged: they are expected traffic under normal operation, and logging
//! them would drown the signal.
//!
//! Disabled by default; enable via `SettleConfig::with_logging(true)`.

use std::time::Instant;

use feedgate_core::FetchToken;

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv_hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= *byte as u64;
        *hash = hash.wrapping_mul(FNV_PRIME);
    }
}

/// One logged orchestration decision.
#[derive(Debug, Clone)]
pub struct DecisionEntry {
    /// Cycle the decision belongs to.
    pub token: FetchToken,
    /// Milliseconds since the cycle began.
    pub elapsed_ms: f64,
    /// Stable action label (`"settle"`, `"arm_grace"`, ...).
    pub action: &'static str,
    /// Materialized item count at decision time.
    pub item_count: u64,
    /// Pending image loads at decision time.
    pub pending_images: u32,
    /// Whether the decision was forced by a fallback timer.
    pub forced: bool,
}

impl DecisionEntry {
    /// Serialize to one JSONL line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"event":"decision","token":{},"elapsed_ms":{:.3},"action":"{}","item_count":{},"pending_images":{},"forced":{}}}"#,
            self.token.get(),
            self.elapsed_ms,
            self.action,
            self.item_count,
            self.pending_images,
            self.forced
        )
    }
}

/// Summary of a decision log.
#[derive(Debug, Clone, Default)]
pub struct DecisionSummary {
    /// Total decisions logged.
    pub decision_count: usize,
    /// Settles (confident and forced).
    pub settle_count: usize,
    /// Settles forced by the grace or deadline timers.
    pub forced_settle_count: usize,
    /// Reveal transitions.
    pub reveal_count: usize,
    /// Deterministic checksum over all entries.
    pub checksum: u64,
}

impl DecisionSummary {
    /// Checksum as hex string.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        format!("{:016x}", self.checksum)
    }

    /// Serialize to one JSONL line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"event":"summary","decisions":{},"settles":{},"forced_settles":{},"reveals":{},"checksum":"{}"}}"#,
            self.decision_count,
            self.settle_count,
            self.forced_settle_count,
            self.reveal_count,
            self.checksum_hex()
        )
    }
}

/// Accumulating decision log, one per orchestrator.
#[derive(Debug)]
pub struct DecisionLog {
    enabled: bool,
    cycle_start: Option<Instant>,
    entries: Vec<DecisionEntry>,
}

impl DecisionLog {
    /// Create a log; records nothing unless `enabled`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cycle_start: None,
            entries: Vec::new(),
        }
    }

    /// Mark the start of a new cycle; elapsed timestamps reset here.
    pub fn begin_cycle(&mut self, now: Instant) {
        if self.enabled {
            self.cycle_start = Some(now);
        }
    }

    /// Record one decision.
    pub fn record(
        &mut self,
        token: FetchToken,
        now: Instant,
        action: &'static str,
        item_count: u64,
        pending_images: u32,
        forced: bool,
    ) {
        if !self.enabled {
            return;
        }
        let elapsed_ms = self
            .cycle_start
            .and_then(|start| now.checked_duration_since(start))
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.entries.push(DecisionEntry {
            token,
            elapsed_ms,
            action,
            item_count,
            pending_images,
            forced,
        });
    }

    /// All logged entries.
    #[must_use]
    pub fn entries(&self) -> &[DecisionEntry] {
        &self.entries
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cycle_start = None;
    }

    /// Export entries plus summary as JSONL, one entry per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut lines: Vec<String> = self.entries.iter().map(DecisionEntry::to_jsonl).collect();
        lines.push(self.summary().to_jsonl());
        lines.join("\n")
    }

    /// Deterministic checksum over all entries.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        for entry in &self.entries {
            fnv_hash_bytes(&mut hash, &entry.token.get().to_le_bytes());
            fnv_hash_bytes(&mut hash, &entry.elapsed_ms.to_bits().to_le_bytes());
            fnv_hash_bytes(&mut hash, entry.action.as_bytes());
            fnv_hash_bytes(&mut hash, &[0u8]); // separator
            fnv_hash_bytes(&mut hash, &entry.item_count.to_le_bytes());
            fnv_hash_bytes(&mut hash, &entry.pending_images.to_le_bytes());
            fnv_hash_bytes(&mut hash, &[entry.forced as u8]);
        }
        hash
    }

    /// Compute a summary of the logged decisions.
    #[must_use]
    pub fn summary(&self) -> DecisionSummary {
        let mut summary = DecisionSummary {
            decision_count: self.entries.len(),
            checksum: self.checksum(),
            ..DecisionSummary::default()
        };
        for entry in &self.entries {
            match entry.action {
                "settle" | "forced_settle" => {
                    summary.settle_count += 1;
                    if entry.forced {
                        summary.forced_settle_count += 1;
                    }
                }
                "reveal" => summary.reveal_count += 1,
                _ => {}
            }
        }
        summary
    }
}
