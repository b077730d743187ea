// ABOUTME: Creates an MO or MT route from command line arguments
// ABOUTME: Demonstrates local routing-rule validation and the create wizard over a live session

//! # Creating a Route
//!
//! The routing rule is checked before anything is sent to the console, so an
//! invalid combination (a round-robin route with one connector, a static
//! route without filters) fails without opening a wizard.
//!
//! ## Usage
//!
//! ```bash
//! # Default MT route through one SMPP client connector
//! cargo run --example create_route -- --direction mt --route-type DefaultRoute \
//!   --smpp smsc-eu --rate 0.0
//!
//! # Round-robin MT route over two connectors behind a filter
//! cargo run --example create_route -- --direction mt \
//!   --route-type RandomRoundrobinMTRoute --order 20 --rate 0.0 \
//!   --smpp smsc-eu --smpp smsc-us --filter all
//! ```

use argh::FromArgs;
use jcli::client::{Session, SessionConfig};
use jcli::resources::{MoRouterManager, MtRouterManager, NewRouter};
use std::error::Error;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Create a routing table entry
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// routing table: mo or mt (default: mt)
    #[argh(option)]
    direction: Option<String>,

    /// route type, e.g. DefaultRoute, StaticMTRoute, RandomRoundrobinMORoute
    #[argh(option, short = 't')]
    route_type: String,

    /// route order (ignored for the default route)
    #[argh(option, short = 'o')]
    order: Option<String>,

    /// route rate, required for MT routes
    #[argh(option, short = 'r')]
    rate: Option<String>,

    /// SMPP connector id, repeatable
    #[argh(option)]
    smpp: Vec<String>,

    /// HTTP connector id, repeatable
    #[argh(option)]
    http: Vec<String>,

    /// filter id, repeatable
    #[argh(option, short = 'f')]
    filter: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = SessionConfig::from_env()?;
    let request = NewRouter {
        route_type: Some(cli_args.route_type),
        order: cli_args.order,
        rate: cli_args.rate,
        smpp_connectors: cli_args.smpp,
        http_connectors: cli_args.http,
        filters: cli_args.filter,
    };
    let mo = cli_args.direction.as_deref() == Some("mo");

    info!("Creating {} route on {}", if mo { "MO" } else { "MT" }, config.address());

    let route = Session::scoped(&config, async |session| {
        if mo {
            session.create_mo_route(&request).await
        } else {
            session.create_mt_route(&request).await
        }
    })
    .await
    .map_err(|e| {
        error!("Route creation failed ({:?}): {e}", e.category());
        Box::<dyn Error>::from(e.to_string())
    })?;

    info!(
        "Route {} ({}) -> {}",
        route.order,
        route.route_type,
        route.connectors.join(", ")
    );
    if !route.filters.is_empty() {
        info!("Filters: {}", route.filters.join(", "));
    }
    Ok(())
}
