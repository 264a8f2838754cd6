//! Prize model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A prize category with a limited stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prize {
    pub id: Uuid,
    pub name: String,
    /// Units still available. Never exceeds `total`.
    pub remaining: u32,
    pub total: u32,
}

impl Prize {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            remaining: quantity,
            total: quantity,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Take one unit for a committed win
    pub fn take_one(&mut self) -> Result<()> {
        if self.remaining == 0 {
            return Err(Error::PrizeExhausted(self.name.clone()));
        }
        self.remaining -= 1;
        Ok(())
    }

    /// Give one unit back after a reroll. Saturates at `total`.
    pub fn restore_one(&mut self) {
        if self.remaining < self.total {
            self.remaining += 1;
        }
    }

    /// Put the full stock back
    pub fn restock(&mut self) {
        self.remaining = self.total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_and_restore() {
        let mut prize = Prize::new("Tablet", 2);
        prize.take_one().unwrap();
        prize.take_one().unwrap();
        assert!(prize.is_exhausted());
        assert!(matches!(prize.take_one(), Err(Error::PrizeExhausted(_))));

        prize.restore_one();
        assert_eq!(prize.remaining, 1);
    }

    #[test]
    fn test_restore_never_exceeds_total() {
        let mut prize = Prize::new("Voucher", 1);
        prize.restore_one();
        assert_eq!(prize.remaining, 1);
    }
}
