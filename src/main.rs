use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use log::error;

use rfivemquery::{run_profile, Address, Profile, QueryConf};

#[derive(Parser, Debug)]
#[command(version, about = "Query FiveM server nodes and their directory", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true)))]
struct Args {
    /// List all available game server nodes
    #[arg(short, long, group = "mode")]
    servers: bool,

    /// General information of a specific game server
    #[arg(short, long, value_name = "SERVER:PORT", group = "mode")]
    info: Option<Address>,

    /// Resources (server version, info version, git revision) of a specific server
    #[arg(short, long, value_name = "SERVER:PORT", group = "mode")]
    resources: Option<Address>,

    /// Connected players of a specific server
    #[arg(short, long, value_name = "SERVER:PORT", group = "mode")]
    players: Option<Address>,

    /// Discover every node and query each of them
    #[arg(short, long, group = "mode")]
    all: bool,

    /// Directory server to ask for nodes
    #[arg(long, value_name = "SERVER:PORT")]
    master: Option<Address>,

    /// Directory collection window, in milliseconds
    #[arg(long, default_value_t = 1000)]
    master_timeout: u64,

    /// Node status timeout, in milliseconds
    #[arg(long, default_value_t = 1000)]
    status_timeout: u64,

    /// HTTP timeout, in milliseconds
    #[arg(long, default_value_t = 500)]
    http_timeout: u64,

    /// With --all, also fetch each node's player list
    #[arg(long)]
    with_players: bool,
}

impl Args {
    fn profile(&self) -> Profile {
        if let Some(address) = &self.info {
            Profile::Info(address.clone())
        } else if let Some(address) = &self.resources {
            Profile::Resources(address.clone())
        } else if let Some(address) = &self.players {
            Profile::Players(address.clone())
        } else if self.all {
            Profile::Full
        } else {
            Profile::Servers
        }
    }

    fn conf(&self) -> QueryConf {
        let mut conf = QueryConf {
            master_timeout: Duration::from_millis(self.master_timeout),
            status_timeout: Duration::from_millis(self.status_timeout),
            enrichment_timeout: Duration::from_millis(self.http_timeout),
            include_players: self.with_players,
            ..QueryConf::default()
        };
        if let Some(master) = &self.master {
            conf = conf.with_master(master.clone());
        }
        conf
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let output = match run_profile(&args.profile(), &args.conf()).await {
        Ok(output) => output,
        Err(e) => {
            error!("query failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("failed to render output: {e}");
            return ExitCode::FAILURE;
        }
    }

    if output.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
