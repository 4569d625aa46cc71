//! Balance snapshot types

use super::{Amount, RpcError};
use std::fmt;

/// One displayed balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalanceValue {
    /// Not read yet, or the last read failed
    #[default]
    Pending,
    Known(Amount),
}

impl BalanceValue {
    pub fn amount(&self) -> Option<Amount> {
        match self {
            BalanceValue::Pending => None,
            BalanceValue::Known(amount) => Some(*amount),
        }
    }
}

impl fmt::Display for BalanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceValue::Pending => f.write_str("…"),
            BalanceValue::Known(amount) => write!(f, "{amount}"),
        }
    }
}

/// Which of the three balances a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceField {
    Eth,
    Token,
    Deposit,
}

impl BalanceField {
    pub fn label(self) -> &'static str {
        match self {
            BalanceField::Eth => "ETH",
            BalanceField::Token => "AgneticGOD",
            BalanceField::Deposit => "Offered",
        }
    }
}

/// The three balances for the session address, always read from chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceSnapshot {
    pub eth: BalanceValue,
    pub token: BalanceValue,
    pub deposit: BalanceValue,
}

impl BalanceSnapshot {
    /// All three balances unknown
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn get(&self, field: BalanceField) -> BalanceValue {
        match field {
            BalanceField::Eth => self.eth,
            BalanceField::Token => self.token,
            BalanceField::Deposit => self.deposit,
        }
    }

    fn set(&mut self, field: BalanceField, value: BalanceValue) {
        match field {
            BalanceField::Eth => self.eth = value,
            BalanceField::Token => self.token = value,
            BalanceField::Deposit => self.deposit = value,
        }
    }

    /// Overwrite every field from a fresh read.
    ///
    /// Fields whose read failed fall back to `Pending`; the failures are
    /// returned so the caller can report them.
    pub fn apply(&mut self, readings: BalanceReadings) -> Vec<(BalanceField, RpcError)> {
        let mut failures = Vec::new();
        let BalanceReadings {
            eth,
            token,
            deposit,
        } = readings;

        for (field, reading) in [(BalanceField::Eth, eth), (BalanceField::Token, token)] {
            match reading {
                Ok(amount) => self.set(field, BalanceValue::Known(amount)),
                Err(e) => {
                    self.set(field, BalanceValue::Pending);
                    failures.push((field, e));
                }
            }
        }
        self.set(BalanceField::Deposit, BalanceValue::Known(deposit));

        failures
    }
}

/// Outcome of one refresh, per field.
///
/// The deposit ledger read never fails at this level: the reader degrades a
/// failed ledger read to zero before building this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReadings {
    pub eth: Result<Amount, RpcError>,
    pub token: Result<Amount, RpcError>,
    pub deposit: Amount,
}

#[cfg(test)]
impl BalanceReadings {
    /// All-or-nothing view: the first failed field wins
    pub fn into_snapshot(self) -> Result<BalanceSnapshot, RpcError> {
        Ok(BalanceSnapshot {
            eth: BalanceValue::Known(self.eth?),
            token: BalanceValue::Known(self.token?),
            deposit: BalanceValue::Known(self.deposit),
        })
    }
}
