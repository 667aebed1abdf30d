//! Duplicate call detection, RFC 5531 section 9.
//!
//! A client that believes a call was lost retransmits it under the same
//! transaction id. Executing the duplicate would repeat its side effects,
//! so the server keeps an at-most-once record keyed by `(xid, client)`.
//! In-flight entries are held for as long as the call runs; completed ones
//! age out after a retention period so the map stays bounded.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Shared record of which transactions this server has already seen.
///
/// One tracker serves all connections. Lookups mutate the map (a fresh
/// transaction is recorded as in progress), and each lookup also expires
/// entries past the retention period.
pub struct TransactionTracker {
    retention_period: Duration,
    transactions: Mutex<HashMap<(u32, String), TransactionState>>,
}

impl TransactionTracker {
    pub fn new(retention_period: Duration) -> Self {
        Self { retention_period, transactions: Mutex::new(HashMap::new()) }
    }

    /// True when this `(xid, client)` pair was already seen, whether still
    /// executing or completed within the retention period. A pair seen for
    /// the first time is recorded as in progress and reported fresh.
    pub fn is_retransmission(&self, xid: u32, client_addr: &str) -> bool {
        let mut transactions =
            self.transactions.lock().expect("transaction map mutex poisoned");
        expire_completed(&mut transactions, self.retention_period);
        match transactions.entry((xid, client_addr.to_string())) {
            Entry::Vacant(slot) => {
                slot.insert(TransactionState::InProgress);
                false
            }
            Entry::Occupied(_) => true,
        }
    }

    /// Moves a transaction from in progress to completed, stamping the
    /// completion time that drives its eventual expiry.
    pub fn mark_processed(&self, xid: u32, client_addr: &str) {
        let key = (xid, client_addr.to_string());
        let mut transactions =
            self.transactions.lock().expect("transaction map mutex poisoned");
        if let Some(state) = transactions.get_mut(&key) {
            *state = TransactionState::Completed(SystemTime::now());
        }
    }
}

/// Drops completed entries older than the retention period. In-progress
/// entries are kept regardless of age; their reply has not gone out yet.
fn expire_completed(
    transactions: &mut HashMap<(u32, String), TransactionState>,
    retention_period: Duration,
) {
    let cutoff = SystemTime::now() - retention_period;
    transactions.retain(|_, state| match state {
        TransactionState::InProgress => true,
        TransactionState::Completed(at) => *at >= cutoff,
    });
}

enum TransactionState {
    InProgress,
    Completed(SystemTime),
}
