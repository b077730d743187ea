// ABOUTME: Lists one kind of console resource and prints it as JSON
// ABOUTME: Shows a scoped session from configuration to release, with tracing output

//! # Listing Console Resources
//!
//! Opens one session, lists the requested resource kind and prints the
//! records as pretty JSON. Connection settings default to `JCLI_*`
//! environment variables and can be overridden on the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Groups on the default console (127.0.0.1:8990)
//! cargo run --example list_resources -- --kind group
//!
//! # MT routes on a remote console with debug output
//! cargo run --example list_resources -- -d \
//!   --host 10.0.0.5 --username admin --password secret \
//!   --kind mt
//! ```

use argh::FromArgs;
use jcli::client::{JcliResult, Session, SessionConfig};
use jcli::resources::{
    FilterManager, GroupManager, HttpConnectorManager, MoRouterManager, MtRouterManager,
    SmppConnectorManager, UserManager,
};
use serde::Serialize;
use std::error::Error;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// List console resources
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// resource kind: group, user, mo, mt, smpp, http or filter (default: group)
    #[argh(option, short = 'k')]
    kind: Option<String>,

    /// the hostname or IP address of the console
    #[argh(option)]
    host: Option<String>,

    /// the console port
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// the console username
    #[argh(option, short = 'u')]
    username: Option<String>,

    /// the console password
    #[argh(option)]
    password: Option<String>,

    /// command timeout in seconds (default: 10)
    #[argh(option)]
    timeout: Option<u64>,
}

fn to_json<T: Serialize>(records: JcliResult<Vec<T>>) -> JcliResult<String> {
    let records = records?;
    info!("Fetched {} records", records.len());
    Ok(serde_json::to_string_pretty(&records).unwrap_or_else(|e| format!("<unserializable: {e}>")))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut config = SessionConfig::from_env()?;
    if let Some(host) = cli_args.host {
        config.host = host;
    }
    if let Some(port) = cli_args.port {
        config.port = port;
    }
    if let Some(username) = cli_args.username {
        config.credentials.username = username;
    }
    if let Some(password) = cli_args.password {
        config.credentials.password = password;
    }
    if let Some(timeout) = cli_args.timeout {
        config = config.with_timeout(Duration::from_secs(timeout));
    }

    let kind = cli_args.kind.unwrap_or_else(|| "group".to_owned());
    info!("Listing {kind} on {}", config.address());

    let output = Session::scoped(&config, async |session| match kind.as_str() {
        "group" => to_json(session.list_groups().await),
        "user" => to_json(session.list_users().await),
        "mo" => to_json(session.list_mo_routes().await),
        "mt" => to_json(session.list_mt_routes().await),
        "smpp" => to_json(session.list_smpp_connectors().await),
        "http" => to_json(session.list_http_connectors().await),
        "filter" => to_json(session.list_filters().await),
        other => Err(jcli::JcliError::InvalidConfig(format!("unknown resource kind {other}"))),
    })
    .await
    .map_err(|e| {
        error!("Listing failed ({:?}): {e}", e.category());
        Box::<dyn Error>::from(e.to_string())
    })?;

    println!("{output}");
    Ok(())
}
