use std::time::Instant;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;

use crate::address::Address;
use crate::conf::{millis, Profile, QueryConf};
use crate::enrich::{fetch_players, fetch_resources, Enrichment, EnrichmentResult};
use crate::error::QueryError;
use crate::info::{query_status, NodeStatus};
use crate::master::discover;

/// Everything learned about one node during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReport {
    pub status: NodeStatus,
    pub resources: Enrichment,
    pub players: Enrichment,
}

/// Result of [run].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    /// The directory query went out. Says nothing about individual nodes.
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub runtime_ms: u64,
    /// Keyed by `host:port`, in discovery order.
    pub per_node: IndexMap<String, NodeReport>,
}

/// Discover every node, then query them one at a time.
///
/// A node that fails status is recorded and skipped for enrichment; the loop
/// never stops early. Only a failure to dispatch the directory request is
/// returned as an error.
pub async fn run(conf: &QueryConf) -> Result<AggregateReport, QueryError> {
    let started = Instant::now();

    let servers: Vec<Address> = discover(&conf.master_host, conf.master_port, conf.master_timeout).await?;

    let mut per_node: IndexMap<String, NodeReport> = IndexMap::with_capacity(servers.len());
    for address in &servers {
        let key = address.to_string();
        if per_node.contains_key(&key) {
            debug!("{key} listed twice, already queried");
            continue;
        }

        let report = query_node(address, conf).await;
        per_node.insert(key, report);
    }

    let runtime_ms = millis(started.elapsed());
    info!(
        "queried {} node(s), {} answered, in {runtime_ms} ms",
        per_node.len(),
        per_node.values().filter(|node| node.status.success).count()
    );

    Ok(AggregateReport {
        success: true,
        timestamp: Utc::now(),
        runtime_ms,
        per_node,
    })
}

/// Status, then enrichment only if status succeeded.
async fn query_node(address: &Address, conf: &QueryConf) -> NodeReport {
    let status = query_status(address, conf.status_timeout).await;
    if !status.success {
        return NodeReport {
            status,
            resources: Enrichment::NotAttempted,
            players: Enrichment::NotAttempted,
        };
    }

    let resources = fetch_resources(address, conf.enrichment_timeout).await.into();
    let players = if conf.include_players {
        fetch_players(address, conf.enrichment_timeout).await.into()
    } else {
        Enrichment::NotAttempted
    };

    NodeReport {
        status,
        resources,
        players,
    }
}

/// What a [Profile] produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileOutput {
    Servers(Vec<Address>),
    Status(NodeStatus),
    Enrichment(EnrichmentResult),
    Report(AggregateReport),
}

impl ProfileOutput {
    /// A server listing always counts as success, even when empty.
    pub fn is_success(&self) -> bool {
        match self {
            ProfileOutput::Servers(_) => true,
            ProfileOutput::Status(status) => status.success,
            ProfileOutput::Enrichment(result) => result.success,
            ProfileOutput::Report(report) => report.success,
        }
    }
}

/// Run `profile` against the pipeline configured by `conf`.
pub async fn run_profile(profile: &Profile, conf: &QueryConf) -> Result<ProfileOutput, QueryError> {
    let output = match profile {
        Profile::Servers => ProfileOutput::Servers(
            discover(&conf.master_host, conf.master_port, conf.master_timeout).await?,
        ),
        Profile::Info(address) => ProfileOutput::Status(query_status(address, conf.status_timeout).await),
        Profile::Resources(address) => {
            ProfileOutput::Enrichment(fetch_resources(address, conf.enrichment_timeout).await)
        }
        Profile::Players(address) => {
            ProfileOutput::Enrichment(fetch_players(address, conf.enrichment_timeout).await)
        }
        Profile::Full => ProfileOutput::Report(run(conf).await?),
    };

    Ok(output)
}
