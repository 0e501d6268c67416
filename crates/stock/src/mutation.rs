//! The stock ledger state machine.
//!
//! A stock quantity is a non-negative counter with exactly two transitions:
//! supply (increment, bounded by `i64::MAX`) and consume (decrement, guarded
//! by `quantity >= n`).

use crate::{Quantity, StockError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockMutation {
    Supply(Quantity),
    Consume(Quantity),
}

impl StockMutation {
    /// Compute the quantity after this mutation, or why it is not allowed.
    pub fn apply(self, current: i64) -> Result<i64, StockError> {
        match self {
            StockMutation::Supply(q) => {
                current
                    .checked_add(q.get())
                    .ok_or(StockError::QuantityOverflow {
                        current,
                        requested: q.get(),
                    })
            }
            StockMutation::Consume(q) => {
                if current < q.get() {
                    return Err(StockError::InsufficientStock {
                        requested: q.get(),
                        available: current,
                    });
                }
                Ok(current - q.get())
            }
        }
    }

    /// Whether a missing stock row is created (at zero) before applying.
    ///
    /// Only supply creates rows; consuming from a pair that was never
    /// supplied is `StockNotAvailable`.
    pub fn creates_missing_row(self) -> bool {
        matches!(self, StockMutation::Supply(_))
    }

    pub fn quantity(self) -> Quantity {
        match self {
            StockMutation::Supply(q) | StockMutation::Consume(q) => q,
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            StockMutation::Supply(_) => "supply",
            StockMutation::Consume(_) => "consume",
        }
    }
}
