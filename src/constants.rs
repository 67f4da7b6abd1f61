/// Application constants

// Chain
pub const BASE_CHAIN_ID: u64 = 8453;
pub const NATIVE_TOKEN_SYMBOL: &str = "ETH";
pub const NATIVE_TOKEN_DECIMALS: usize = 18;
pub const BALANCE_DISPLAY_DECIMALS: usize = 4;

// Default upstream endpoints
pub const DEFAULT_BASE_RPC_URL: &str = "https://mainnet.base.org";
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api";
pub const DEFAULT_HOLDINGS_API_URL: &str = "https://base.blockscout.com/api/v2";
pub const DEFAULT_HOLDINGS_FALLBACK_API_URL: &str = "https://base.blockscout.com/api";
pub const DEFAULT_ENS_API_URL: &str = "https://api.ensideas.com/ens/resolve";
pub const DEFAULT_WEB3BIO_API_URL: &str = "https://api.web3.bio/ns";

// Basenames L2 resolver on Base mainnet
pub const DEFAULT_BASENAME_RESOLVER_ADDRESS: &str = "0xC6d566A56A1aFf6508b41f6c90ff131615583BCD";
// ENSIP-19 reverse namespace for coin type 0x80000000 | 8453
pub const BASE_REVERSE_NAMESPACE: &str = "80002105.reverse";
// name(bytes32)
pub const RESOLVER_NAME_SELECTOR: &str = "691f3431";

// Timeouts (milliseconds)
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_EXPLORER_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_NAME_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_HOLDINGS_TIMEOUT_MS: u64 = 6_000;

// Explorer paging
pub const DEFAULT_ACTIVITY_PAGE_SIZE: u32 = 1_000;
pub const MAX_ACTIVITY_PAGE_SIZE: u32 = 10_000;
// Upper block bound for txlist queries, far past any foreseeable Base height
pub const EXPLORER_END_BLOCK: &str = "9999999999";

// Display sentinels
pub const TIMESTAMP_UNKNOWN: &str = "unknown";
pub const TIMESTAMP_NO_ACTIVITY: &str = "No activity";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// Share redirect
pub const WARPCAST_COMPOSE_URL: &str = "https://warpcast.com/~/compose";
pub const DEFAULT_SHARE_TEXT: &str = "Check out BaseBoard - analyze your Base wallet activity";
pub const DEFAULT_APP_URL: &str = "https://baseboard-gamma.vercel.app";

// API version
pub const API_VERSION: &str = "v1";
