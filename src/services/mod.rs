// Per-field resolvers and the aggregator that runs them
pub mod activity_resolver;
pub mod balance_resolver;
pub mod holdings_resolver;
pub mod identity_resolver;
pub mod wallet_analyzer;

pub use wallet_analyzer::WalletAnalyzer;
