// ABOUTME: SMPP client connector management over the `smppccm` console command
// ABOUTME: Records merge the listing's runtime columns with the `-s` configuration block

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::CommandDriver;
use crate::client::wizard::{self, WizardStep};
use crate::resources::{
    Action, ResourceKind, list_rows, open_add, open_update, require_id, require_id_opt, run_action,
    show,
};
use crate::response::{TableRow, detail_lines, parse_attribute_block_lossy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const UNKNOWN: &str = "Unknown connector: ";
const ADD_BANNER: &str = "Adding a new connector";
const UPDATE_BANNER: &str = "Updating connector";

/// An SMPP client connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmppConnector {
    pub cid: String,
    /// `started` or `stopped`
    pub service: String,
    /// SMPP session state, `None` when not bound
    pub session: String,
    pub starts: String,
    pub stops: String,
    /// Configuration keys shown by `smppccm -s`
    pub config: BTreeMap<String, String>,
}

impl SmppConnector {
    fn from_row(row: &TableRow, config: BTreeMap<String, String>) -> Self {
        let column = |index| row.column(index).unwrap_or_default().to_string();
        Self {
            cid: row.id().to_string(),
            service: column(1),
            session: column(2),
            starts: column(3),
            stops: column(4),
            config,
        }
    }
}

/// Fields for `smppccm -a`: a connector id plus any configuration keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewSmppConnector {
    pub cid: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl NewSmppConnector {
    pub fn new(cid: impl Into<String>) -> Self {
        Self {
            cid: Some(cid.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// `cid` first, then the remaining keys
    fn steps(&self) -> JcliResult<Vec<WizardStep>> {
        let cid = require_id_opt(self.cid.as_deref(), "cid")?;
        let mut steps = vec![WizardStep::new("cid", cid)?];
        steps.extend(pairs_to_steps(
            self.attributes.iter().filter(|(key, _)| key.as_str() != "cid"),
        )?);
        Ok(steps)
    }
}

fn pairs_to_steps<'a>(pairs: impl Iterator<Item = (&'a String, &'a String)>) -> JcliResult<Vec<WizardStep>> {
    pairs
        .map(|(key, value)| WizardStep::from_tokens([key.as_str(), value.as_str()]))
        .collect()
}

pub trait SmppConnectorManager {
    async fn list_smpp_connectors(&mut self) -> JcliResult<Vec<SmppConnector>>;
    async fn get_smpp_connector(&mut self, cid: &str) -> JcliResult<SmppConnector>;
    async fn create_smpp_connector(&mut self, connector: &NewSmppConnector) -> JcliResult<SmppConnector>;
    async fn update_smpp_connector(
        &mut self,
        cid: &str,
        updates: &BTreeMap<String, String>,
    ) -> JcliResult<SmppConnector>;
    async fn remove_smpp_connector(&mut self, cid: &str) -> JcliResult<()>;
    /// Start the connector service; runtime only, nothing is persisted
    async fn start_smpp_connector(&mut self, cid: &str) -> JcliResult<()>;
    /// Stop the connector service; runtime only, nothing is persisted
    async fn stop_smpp_connector(&mut self, cid: &str) -> JcliResult<()>;
}

impl<D: CommandDriver> SmppConnectorManager for D {
    async fn list_smpp_connectors(&mut self) -> JcliResult<Vec<SmppConnector>> {
        let rows = list_rows(self, ResourceKind::SmppConnector).await?;

        let mut connectors = Vec::with_capacity(rows.len());
        for row in &rows {
            match fetch_config(self, row.id()).await {
                Ok(config) => connectors.push(SmppConnector::from_row(row, config)),
                Err(JcliError::NotFound { id, .. }) => debug!("Connector {id} vanished while listing"),
                Err(e) => return Err(e),
            }
        }
        Ok(connectors)
    }

    async fn get_smpp_connector(&mut self, cid: &str) -> JcliResult<SmppConnector> {
        let cid = require_id(cid, "cid")?;
        let config = fetch_config(self, cid).await?;

        let rows = list_rows(self, ResourceKind::SmppConnector).await?;
        rows.iter()
            .find(|row| row.id() == cid)
            .map(|row| SmppConnector::from_row(row, config))
            .ok_or_else(|| JcliError::not_found(ResourceKind::SmppConnector, cid))
    }

    async fn create_smpp_connector(&mut self, connector: &NewSmppConnector) -> JcliResult<SmppConnector> {
        let steps = connector.steps()?;
        let cid = require_id_opt(connector.cid.as_deref(), "cid")?;

        open_add(self, ResourceKind::SmppConnector, ADD_BANNER).await?;
        wizard::run(self, &steps).await?;
        self.persist().await?;

        info!("Created SMPP connector {cid}");
        self.get_smpp_connector(cid).await
    }

    async fn update_smpp_connector(
        &mut self,
        cid: &str,
        updates: &BTreeMap<String, String>,
    ) -> JcliResult<SmppConnector> {
        let cid = require_id(cid, "cid")?;
        if updates.is_empty() {
            return Err(JcliError::MissingParameter("updates".to_string()));
        }
        let steps = pairs_to_steps(updates.iter())?;

        open_update(self, ResourceKind::SmppConnector, cid, UPDATE_BANNER, UNKNOWN).await?;
        wizard::run(self, &steps).await?;
        self.persist().await?;

        info!("Updated SMPP connector {cid} ({} changes)", steps.len());
        self.get_smpp_connector(cid).await
    }

    async fn remove_smpp_connector(&mut self, cid: &str) -> JcliResult<()> {
        run_action(self, ResourceKind::SmppConnector, Action::Remove, cid, UNKNOWN).await?;
        info!("Removed SMPP connector {cid}");
        Ok(())
    }

    async fn start_smpp_connector(&mut self, cid: &str) -> JcliResult<()> {
        run_action(self, ResourceKind::SmppConnector, Action::Start, cid, UNKNOWN).await?;
        info!("Started SMPP connector {cid}");
        Ok(())
    }

    async fn stop_smpp_connector(&mut self, cid: &str) -> JcliResult<()> {
        run_action(self, ResourceKind::SmppConnector, Action::Stop, cid, UNKNOWN).await?;
        info!("Stopped SMPP connector {cid}");
        Ok(())
    }
}

async fn fetch_config<D: CommandDriver>(driver: &mut D, cid: &str) -> JcliResult<BTreeMap<String, String>> {
    let text = show(driver, ResourceKind::SmppConnector, cid, UNKNOWN).await?;
    Ok(parse_attribute_block_lossy(detail_lines(&text)).into_flat())
}
