// ABOUTME: MO and MT routing table management over the `morouter` and `mtrouter` console commands
// ABOUTME: Route requests are validated against the routing rule before the wizard is opened

//! Routers
//!
//! Both routing tables share one shape; [`Direction`] selects the console
//! command and the few places where they differ (connector prefix, rate).
//!
//! The console accepts nearly any combination of wizard keys and only
//! complains once the route is saved, so the routing rule is enforced here:
//!
//! | Route type | Filters | Connectors |
//! |---|---|---|
//! | `DefaultRoute` | ignored | exactly 1 |
//! | `RandomRoundrobin*` | at least 1 | at least 2 |
//! | anything else | at least 1 | exactly 1 |
//!
//! Filters are checked before connectors. The default route always sits at
//! order `0`.

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::CommandDriver;
use crate::client::wizard::{self, WizardStep};
use crate::expect::{Expect, Prompt};
use crate::resources::{
    Action, ResourceKind, list_rows, open_add, require_id, require_id_opt, require_opt, run_action,
};
use crate::response::TableRow;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Order of the catch-all route
pub const DEFAULT_ORDER: &str = "0";

/// Which routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Mobile-originated: from SMPP server connectors to users and HTTP endpoints
    Mo,
    /// Mobile-terminated: towards SMPP client connectors and HTTP endpoints
    Mt,
}

impl Direction {
    pub fn kind(self) -> ResourceKind {
        match self {
            Direction::Mo => ResourceKind::MoRoute,
            Direction::Mt => ResourceKind::MtRoute,
        }
    }

    fn smpp_prefix(self) -> &'static str {
        match self {
            Direction::Mo => "smpps",
            Direction::Mt => "smppc",
        }
    }

    fn banner(self) -> &'static str {
        match self {
            Direction::Mo => "Adding a new MO Route",
            Direction::Mt => "Adding a new MT Route",
        }
    }

    fn unknown(self) -> &'static str {
        match self {
            Direction::Mo => "Unknown MO Route: ",
            Direction::Mt => "Unknown MT Route: ",
        }
    }

    /// Listing column holding the connector list (MT listings have a rate column first)
    fn connectors_column(self) -> usize {
        match self {
            Direction::Mo => 2,
            Direction::Mt => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteClass {
    Default,
    RoundRobin,
    Single,
}

impl RouteClass {
    fn of(route_type: &str) -> Self {
        let route_type = route_type.to_ascii_lowercase();
        if route_type == "defaultroute" {
            RouteClass::Default
        } else if route_type.starts_with("randomroundrobin") {
            RouteClass::RoundRobin
        } else {
            RouteClass::Single
        }
    }
}

/// One routing table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Router {
    pub order: String,
    #[serde(rename = "type")]
    pub route_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    pub connectors: Vec<String>,
    pub filters: Vec<String>,
}

impl Router {
    fn from_row(row: &TableRow, direction: Direction) -> Self {
        let connectors_at = direction.connectors_column();
        let rate = match direction {
            Direction::Mt => Some(row.column(2).unwrap_or_default().to_string()),
            Direction::Mo => None,
        };
        let connectors = row
            .column(connectors_at)
            .map(|column| {
                column
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            order: row.id().to_string(),
            route_type: row.column(1).unwrap_or_default().to_string(),
            rate,
            connectors,
            filters: row.list_from(connectors_at + 1),
        }
    }
}

/// Request for a new route
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewRouter {
    #[serde(rename = "type")]
    pub route_type: Option<String>,
    /// Ignored for the default route
    pub order: Option<String>,
    /// Required for MT routes, ignored for MO routes
    pub rate: Option<String>,
    #[serde(default)]
    pub smpp_connectors: Vec<String>,
    #[serde(default)]
    pub http_connectors: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
}

/// A validated route request
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RoutePlan {
    pub order: String,
    pub is_default: bool,
    pub steps: Vec<WizardStep>,
}

impl NewRouter {
    pub fn new(route_type: impl Into<String>) -> Self {
        Self {
            route_type: Some(route_type.into()),
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    pub fn with_smpp_connector(mut self, cid: impl Into<String>) -> Self {
        self.smpp_connectors.push(cid.into());
        self
    }

    pub fn with_http_connector(mut self, cid: impl Into<String>) -> Self {
        self.http_connectors.push(cid.into());
        self
    }

    pub fn with_filter(mut self, fid: impl Into<String>) -> Self {
        self.filters.push(fid.into());
        self
    }

    /// Apply the routing rule and build the wizard lines, without any console
    /// interaction
    pub(crate) fn plan(&self, direction: Direction) -> JcliResult<RoutePlan> {
        let route_type = require_id_opt(self.route_type.as_deref(), "type")?.to_ascii_lowercase();
        let class = RouteClass::of(&route_type);

        let mut steps = vec![WizardStep::new("type", route_type.as_str())?];
        let order = if class == RouteClass::Default {
            DEFAULT_ORDER.to_string()
        } else {
            let filters = non_blank(&self.filters);
            if filters.is_empty() {
                return Err(JcliError::MissingParameter(format!(
                    "filters ({route_type} router requires filters)"
                )));
            }
            let order = require_id_opt(self.order.as_deref(), "order")?;
            steps.push(WizardStep::new("filters", filters.join(";"))?);
            steps.push(WizardStep::new("order", order)?);
            order.to_string()
        };

        let connectors: Vec<String> = non_blank(&self.smpp_connectors)
            .into_iter()
            .map(|cid| format!("{}({cid})", direction.smpp_prefix()))
            .chain(
                non_blank(&self.http_connectors)
                    .into_iter()
                    .map(|cid| format!("http({cid})")),
            )
            .collect();

        match class {
            RouteClass::RoundRobin => {
                if connectors.len() < 2 {
                    return Err(JcliError::MultipleValuesRequired(
                        "Round Robin route requires at least two connectors".to_string(),
                    ));
                }
                steps.push(WizardStep::new("connectors", connectors.join(";"))?);
            }
            RouteClass::Default | RouteClass::Single => {
                let [connector] = connectors.as_slice() else {
                    return Err(JcliError::MissingParameter(
                        "connector (one and only one connector required)".to_string(),
                    ));
                };
                steps.push(WizardStep::new("connector", connector.as_str())?);
            }
        }

        if direction == Direction::Mt {
            let rate = require_opt(self.rate.as_deref(), "rate")?;
            steps.push(WizardStep::new("rate", rate)?);
        }

        Ok(RoutePlan {
            order,
            is_default: class == RouteClass::Default,
            steps,
        })
    }
}

/// Orders are integers on the console, so `020` and `20` name the same route
fn same_order(a: &str, b: &str) -> bool {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn non_blank(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect()
}

async fn list_routes<D: CommandDriver>(driver: &mut D, direction: Direction) -> JcliResult<Vec<Router>> {
    let rows = list_rows(driver, direction.kind()).await?;
    Ok(rows.iter().map(|row| Router::from_row(row, direction)).collect())
}

async fn get_route<D: CommandDriver>(driver: &mut D, direction: Direction, order: &str) -> JcliResult<Router> {
    let order = require_id(order, "order")?;
    list_routes(driver, direction)
        .await?
        .into_iter()
        .find(|route| same_order(&route.order, order))
        .ok_or_else(|| JcliError::not_found(direction.kind(), order))
}

async fn create_route<D: CommandDriver>(
    driver: &mut D,
    direction: Direction,
    request: &NewRouter,
) -> JcliResult<Router> {
    let plan = request.plan(direction)?;

    // the default route replaces the existing one; any other order must be free
    if !plan.is_default {
        let taken = list_routes(driver, direction)
            .await?
            .iter()
            .any(|route| same_order(&route.order, &plan.order));
        if taken {
            return Err(JcliError::Validation(format!(
                "{} with order {} already exists",
                direction.kind(),
                plan.order
            )));
        }
    }

    open_add(driver, direction.kind(), direction.banner()).await?;
    wizard::run(driver, &plan.steps).await?;
    driver.persist().await?;

    info!("Created {} at order {}", direction.kind(), plan.order);
    get_route(driver, direction, &plan.order).await
}

async fn remove_route<D: CommandDriver>(driver: &mut D, direction: Direction, order: &str) -> JcliResult<()> {
    run_action(driver, direction.kind(), Action::Remove, order, direction.unknown()).await?;
    info!("Removed {} at order {order}", direction.kind());
    Ok(())
}

async fn flush_routes<D: CommandDriver>(driver: &mut D, direction: Direction) -> JcliResult<()> {
    let expect = Expect::new().success(r".*", Prompt::Standard);
    driver
        .execute(&format!("{} -f", direction.kind().command()), &expect)
        .await?;
    driver.persist().await?;

    info!("Flushed {} table", direction.kind());
    Ok(())
}

pub trait MoRouterManager {
    async fn list_mo_routes(&mut self) -> JcliResult<Vec<Router>>;
    async fn get_mo_route(&mut self, order: &str) -> JcliResult<Router>;
    async fn create_mo_route(&mut self, request: &NewRouter) -> JcliResult<Router>;
    async fn remove_mo_route(&mut self, order: &str) -> JcliResult<()>;
    /// Remove every MO route
    async fn flush_mo_routes(&mut self) -> JcliResult<()>;
}

impl<D: CommandDriver> MoRouterManager for D {
    async fn list_mo_routes(&mut self) -> JcliResult<Vec<Router>> {
        list_routes(self, Direction::Mo).await
    }

    async fn get_mo_route(&mut self, order: &str) -> JcliResult<Router> {
        get_route(self, Direction::Mo, order).await
    }

    async fn create_mo_route(&mut self, request: &NewRouter) -> JcliResult<Router> {
        create_route(self, Direction::Mo, request).await
    }

    async fn remove_mo_route(&mut self, order: &str) -> JcliResult<()> {
        remove_route(self, Direction::Mo, order).await
    }

    async fn flush_mo_routes(&mut self) -> JcliResult<()> {
        flush_routes(self, Direction::Mo).await
    }
}

pub trait MtRouterManager {
    async fn list_mt_routes(&mut self) -> JcliResult<Vec<Router>>;
    async fn get_mt_route(&mut self, order: &str) -> JcliResult<Router>;
    async fn create_mt_route(&mut self, request: &NewRouter) -> JcliResult<Router>;
    async fn remove_mt_route(&mut self, order: &str) -> JcliResult<()>;
    /// Remove every MT route
    async fn flush_mt_routes(&mut self) -> JcliResult<()>;
}

impl<D: CommandDriver> MtRouterManager for D {
    async fn list_mt_routes(&mut self) -> JcliResult<Vec<Router>> {
        list_routes(self, Direction::Mt).await
    }

    async fn get_mt_route(&mut self, order: &str) -> JcliResult<Router> {
        get_route(self, Direction::Mt, order).await
    }

    async fn create_mt_route(&mut self, request: &NewRouter) -> JcliResult<Router> {
        create_route(self, Direction::Mt, request).await
    }

    async fn remove_mt_route(&mut self, order: &str) -> JcliResult<()> {
        remove_route(self, Direction::Mt, order).await
    }

    async fn flush_mt_routes(&mut self) -> JcliResult<()> {
        flush_routes(self, Direction::Mt).await
    }
}
