//! Account model and credit packages.

use serde::{Deserialize, Serialize};

/// Signed-in user and their credit balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Display name
    pub name: String,
    /// Remaining edit credits
    pub credits: u64,
}

impl Account {
    pub fn new(name: impl Into<String>, credits: u64) -> Self {
        Self { name: name.into(), credits }
    }

    /// Preset used by the "Continue with Google" demo login.
    pub fn demo() -> Self {
        Self::new("Demo User", 25)
    }

    /// Preset used by guest login.
    pub fn guest() -> Self {
        Self::new("Guest", 5)
    }

    pub const fn can_afford(&self, cost: u64) -> bool {
        self.credits >= cost
    }

    /// Copy of this account with `cost` credits removed, or `None` if the balance is too low.
    pub fn debited(&self, cost: u64) -> Option<Self> {
        let credits = self.credits.checked_sub(cost)?;
        Some(Self { name: self.name.clone(), credits })
    }

    /// Apply a signed balance change. Returns `false` (and leaves the balance) if it would go negative.
    pub fn adjust(&mut self, delta: i64) -> bool {
        let next = if delta >= 0 {
            self.credits.checked_add(delta.unsigned_abs())
        } else {
            self.credits.checked_sub(delta.unsigned_abs())
        };
        match next {
            Some(credits) => {
                self.credits = credits;
                true
            },
            None => false,
        }
    }
}

/// A purchasable bundle of credits.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CreditPackage {
    pub credits: u64,
    /// Price in USD
    pub price: f64,
    pub popular: bool,
}

/// Packages offered in the credits dialog.
pub const CREDIT_PACKAGES: [CreditPackage; 3] = [
    CreditPackage { credits: 50, price: 4.99, popular: false },
    CreditPackage { credits: 120, price: 9.99, popular: true },
    CreditPackage { credits: 300, price: 19.99, popular: false },
];

impl CreditPackage {
    /// Find a package by its credit amount.
    pub fn find(credits: u64) -> Option<Self> {
        CREDIT_PACKAGES.iter().copied().find(|pkg| pkg.credits == credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debited_never_goes_negative() {
        let account = Account::new("Guest", 1);
        assert_eq!(account.debited(1).map(|a| a.credits), Some(0));
        assert!(account.debited(2).is_none());
    }

    #[test]
    fn test_adjust() {
        let mut account = Account::guest();
        assert!(account.adjust(120));
        assert_eq!(account.credits, 125);
        assert!(!account.adjust(-200));
        assert_eq!(account.credits, 125);
        assert!(account.adjust(-125));
        assert_eq!(account.credits, 0);
    }

    #[test]
    fn test_find_package() {
        assert!(CreditPackage::find(120).is_some_and(|pkg| pkg.popular));
        assert!(CreditPackage::find(7).is_none());
    }
}
