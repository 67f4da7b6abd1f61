// src/models/mod.rs
pub mod wallet;

use serde::Serialize;

pub use wallet::{
    Balance, Resolution, SummaryField, TxCountSource, WalletAddress, WalletSummary,
};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
