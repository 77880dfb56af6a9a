//! Identity/credits collaborator.
//!
//! The core never implements payment; it only reads the balance and records
//! debits and purchases through this interface.

use photronic_types::{Account, PlanError};
use tracing::info;

/// Opaque account ledger.
pub trait CreditLedger: Send {
    /// Current account snapshot.
    fn account(&self) -> Account;

    /// Apply a signed balance change. Fails without side effects if the balance would go negative.
    fn adjust_credits(&mut self, delta: i64) -> Result<Account, PlanError>;
}

/// In-process ledger backed by a single account.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    account: Account,
}

impl MemoryLedger {
    pub fn new(account: Account) -> Self {
        Self { account }
    }
}

impl CreditLedger for MemoryLedger {
    fn account(&self) -> Account {
        self.account.clone()
    }

    fn adjust_credits(&mut self, delta: i64) -> Result<Account, PlanError> {
        let mut next = self.account.clone();
        if !next.adjust(delta) {
            return Err(PlanError::InsufficientCredits {
                required: delta.unsigned_abs(),
                available: self.account.credits,
            });
        }
        info!("Credits for {}: {} -> {}", next.name, self.account.credits, next.credits);
        self.account = next;
        Ok(self.account.clone())
    }
}
