//! Pure Rust async client for FiveM (GTA5) server discovery: the dpmaster
//! `getservers` directory query, the `getinfo` node status query, and the
//! `/info.json` and `/players.json` HTTP documents each node serves.
pub mod address;
pub mod conf;
pub mod enrich;
pub mod error;
pub mod info;
pub mod master;
pub mod packet;
mod parse;
pub mod query;

pub use address::{parse_address, Address};
pub use conf::{Profile, QueryConf};
pub use error::QueryError;
pub use query::{run, run_profile, AggregateReport, ProfileOutput};
