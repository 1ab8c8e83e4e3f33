use std::time::Duration;

use crate::address::Address;

/// Hosts and timeouts for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConf {
    /// Directory (dpmaster) host.
    pub master_host: String,
    pub master_port: u16,
    /// How long directory replies are collected.
    pub master_timeout: Duration,
    /// Per-node `getinfo` timeout.
    pub status_timeout: Duration,
    /// Per-request HTTP timeout.
    pub enrichment_timeout: Duration,
    /// Also fetch `/players.json` for every node that answered.
    pub include_players: bool,
}

impl Default for QueryConf {
    fn default() -> Self {
        Self {
            master_host: "updater.fivereborn.com".into(),
            master_port: 30110,
            master_timeout: Duration::from_millis(1000),
            status_timeout: Duration::from_millis(1000),
            enrichment_timeout: Duration::from_millis(500),
            include_players: false,
        }
    }
}

impl QueryConf {
    /// Point the run at another directory.
    pub fn with_master(mut self, master: Address) -> Self {
        self.master_host = master.host;
        self.master_port = master.port;
        self
    }
}

/// Whole milliseconds in `duration`, saturating at [u64::MAX].
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// What a caller asks for. Each profile is one shape of the same pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    /// Directory listing only.
    Servers,
    /// Status of one node.
    Info(Address),
    /// `/info.json` of one node.
    Resources(Address),
    /// `/players.json` of one node.
    Players(Address),
    /// Discovery, then status and enrichment of every node.
    Full,
}
