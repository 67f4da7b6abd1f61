use std::fmt;

use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Serialize, Serializer};

use crate::{
    constants::{
        BALANCE_DISPLAY_DECIMALS, NATIVE_TOKEN_SYMBOL, TIMESTAMP_NO_ACTIVITY, TIMESTAMP_UNKNOWN,
    },
    error::{AppError, Result},
    utils::format_timestamp,
};

/// A validated 20-byte Base account address.
///
/// Equality compares the underlying bytes, so two inputs differing only in
/// hex case are the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalletAddress(Address);

impl WalletAddress {
    /// Accepts exactly `0x` followed by 40 hex digits. Nothing else is
    /// normalized away: surrounding whitespace, a `0X` prefix or an ENS name
    /// all fail with `InvalidAddressFormat`.
    pub fn parse(raw: &str) -> Result<Self> {
        let digits = raw
            .strip_prefix("0x")
            .ok_or(AppError::InvalidAddressFormat)?;
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::InvalidAddressFormat);
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| AppError::InvalidAddressFormat)?;
        Ok(Self(Address::from(bytes)))
    }

    /// Lowercase `0x`-prefixed form used in upstream requests.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.as_bytes()))
    }

    /// EIP-55 checksummed form used for display.
    pub fn to_checksum(&self) -> String {
        ethers::utils::to_checksum(&self.0, None)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

/// Outcome of resolving one summary field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The upstream answered with a value.
    Known(T),
    /// The upstream answered that there is nothing (no name, no activity).
    Absent,
    /// Every source failed; the field will show a default.
    Undetermined,
}

impl<T> Resolution<T> {
    pub fn is_undetermined(&self) -> bool {
        matches!(self, Resolution::Undetermined)
    }

    pub fn known(self) -> Option<T> {
        match self {
            Resolution::Known(value) => Some(value),
            _ => None,
        }
    }
}

/// Native balance rendered with a fixed number of fraction digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub amount: String,
    pub unit: String,
}

impl Balance {
    /// Default shown when the balance could not be fetched.
    pub fn zero() -> Self {
        Self {
            amount: format!("0.{}", "0".repeat(BALANCE_DISPLAY_DECIMALS)),
            unit: NATIVE_TOKEN_SYMBOL.to_string(),
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

/// Where the transaction count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TxCountSource {
    /// Length of one explorer page. When `capped` the page was full and the
    /// lifetime count is at least this value, not exactly it.
    #[serde(rename_all = "camelCase")]
    ExplorerPage { page_size: u32, capped: bool },
    /// Account nonce from the RPC node (outgoing transactions only).
    Nonce,
    Unavailable,
}

/// Fields that can fall back to a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SummaryField {
    Balance,
    TxCount,
    FirstTx,
    LastTx,
    Name,
    Holdings,
}

/// Renders an activity timestamp or its sentinel.
pub fn display_activity_timestamp(value: &Resolution<DateTime<Utc>>) -> String {
    match value {
        Resolution::Known(ts) => format_timestamp(ts),
        Resolution::Absent => TIMESTAMP_NO_ACTIVITY.to_string(),
        Resolution::Undetermined => TIMESTAMP_UNKNOWN.to_string(),
    }
}

/// Aggregated, immutable view of one wallet. Built once per analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    address: WalletAddress,
    balance: Balance,
    balance_display: String,
    tx_count: u64,
    tx_count_source: TxCountSource,
    first_tx: String,
    last_tx: String,
    name: Option<String>,
    holdings_count: u64,
    undetermined: Vec<SummaryField>,
}

impl WalletSummary {
    pub fn builder(address: WalletAddress) -> WalletSummaryBuilder {
        WalletSummaryBuilder {
            address,
            balance: Resolution::Undetermined,
            tx_count: 0,
            tx_count_source: TxCountSource::Unavailable,
            first_tx: Resolution::Undetermined,
            last_tx: Resolution::Undetermined,
            name: Resolution::Undetermined,
            holdings: Resolution::Undetermined,
        }
    }

    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    pub fn tx_count(&self) -> u64 {
        self.tx_count
    }

    pub fn tx_count_source(&self) -> TxCountSource {
        self.tx_count_source
    }

    pub fn first_tx(&self) -> &str {
        &self.first_tx
    }

    pub fn last_tx(&self) -> &str {
        &self.last_tx
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn holdings_count(&self) -> u64 {
        self.holdings_count
    }

    pub fn undetermined(&self) -> &[SummaryField] {
        &self.undetermined
    }

    #[cfg(test)]
    pub fn is_undetermined(&self, field: SummaryField) -> bool {
        self.undetermined.contains(&field)
    }
}

pub struct WalletSummaryBuilder {
    address: WalletAddress,
    balance: Resolution<Balance>,
    tx_count: u64,
    tx_count_source: TxCountSource,
    first_tx: Resolution<DateTime<Utc>>,
    last_tx: Resolution<DateTime<Utc>>,
    name: Resolution<String>,
    holdings: Resolution<u64>,
}

impl WalletSummaryBuilder {
    pub fn balance(mut self, balance: Resolution<Balance>) -> Self {
        self.balance = balance;
        self
    }

    pub fn activity(
        mut self,
        tx_count: u64,
        source: TxCountSource,
        first_tx: Resolution<DateTime<Utc>>,
        last_tx: Resolution<DateTime<Utc>>,
    ) -> Self {
        self.tx_count = tx_count;
        self.tx_count_source = source;
        self.first_tx = first_tx;
        self.last_tx = last_tx;
        self
    }

    pub fn name(mut self, name: Resolution<String>) -> Self {
        self.name = name;
        self
    }

    pub fn holdings(mut self, holdings: Resolution<u64>) -> Self {
        self.holdings = holdings;
        self
    }

    pub fn build(self) -> WalletSummary {
        let mut undetermined = Vec::new();
        if self.balance.is_undetermined() {
            undetermined.push(SummaryField::Balance);
        }
        if self.tx_count_source == TxCountSource::Unavailable {
            undetermined.push(SummaryField::TxCount);
        }
        if self.first_tx.is_undetermined() {
            undetermined.push(SummaryField::FirstTx);
        }
        if self.last_tx.is_undetermined() {
            undetermined.push(SummaryField::LastTx);
        }
        if self.name.is_undetermined() {
            undetermined.push(SummaryField::Name);
        }
        if self.holdings.is_undetermined() {
            undetermined.push(SummaryField::Holdings);
        }

        let balance = self.balance.known().unwrap_or_else(Balance::zero);
        WalletSummary {
            address: self.address,
            balance_display: balance.to_string(),
            balance,
            tx_count: self.tx_count,
            tx_count_source: self.tx_count_source,
            first_tx: display_activity_timestamp(&self.first_tx),
            last_tx: display_activity_timestamp(&self.last_tx),
            name: self.name.known(),
            holdings_count: self.holdings.known().unwrap_or(0),
            undetermined,
        }
    }
}
