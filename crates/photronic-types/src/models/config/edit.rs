//! Edit pricing configuration.

use serde::{Deserialize, Serialize};

use crate::models::plan::{EditOperation, OperationKind};

/// Credits charged per operation kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostTable {
    #[serde(default = "one")]
    pub add: u64,
    #[serde(default = "one")]
    pub modify: u64,
    #[serde(default)]
    pub delete: u64,
    #[serde(default)]
    pub none: u64,
}

const fn one() -> u64 {
    1
}

impl Default for CostTable {
    fn default() -> Self {
        Self { add: 1, modify: 1, delete: 0, none: 0 }
    }
}

impl CostTable {
    pub const fn cost_of(&self, kind: OperationKind) -> u64 {
        match kind {
            OperationKind::Add => self.add,
            OperationKind::Modify => self.modify,
            OperationKind::Delete => self.delete,
            OperationKind::None => self.none,
        }
    }

    /// Total price of a sequence of operations (saturating).
    pub fn total<'a>(&self, operations: impl IntoIterator<Item = &'a EditOperation>) -> u64 {
        operations.into_iter().fold(0u64, |acc, op| acc.saturating_add(self.cost_of(op.kind())))
    }
}

/// Edit application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditConfig {
    #[serde(default)]
    pub costs: CostTable,
}
