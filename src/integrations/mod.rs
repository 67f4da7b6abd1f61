// External data sources. Every outbound call goes through `http::FetchGate`.
pub mod base_rpc;
pub mod blockscout;
pub mod explorer;
pub mod http;
pub mod name_service;

pub use http::{FetchGate, ReqwestTransport};
