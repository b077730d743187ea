// ABOUTME: HTTP client connector management over the `httpccm` console command
// ABOUTME: Connectors are created once and removed; the console offers no update wizard for them

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::CommandDriver;
use crate::client::wizard::{self, WizardStep};
use crate::resources::{
    Action, ResourceKind, list_rows, open_add, require_id, require_id_opt, require_opt, run_action,
    show,
};
use crate::response::{TableRow, detail_lines, parse_attribute_block_lossy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const UNKNOWN: &str = "Unknown Httpcc: ";
const BANNER: &str = "Adding a new Httpcc";

/// An HTTP client connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpConnector {
    pub cid: String,
    #[serde(rename = "type")]
    pub connector_type: String,
    pub method: String,
    pub url: String,
    pub config: BTreeMap<String, String>,
}

impl HttpConnector {
    fn from_row(row: &TableRow, config: BTreeMap<String, String>) -> Self {
        let column = |index| row.column(index).unwrap_or_default().to_string();
        Self {
            cid: row.id().to_string(),
            connector_type: column(1),
            method: column(2),
            url: row.rest(3),
            config,
        }
    }
}

/// Fields for `httpccm -a`; all three are required
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewHttpConnector {
    pub cid: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
}

impl NewHttpConnector {
    pub fn new(cid: impl Into<String>, url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            cid: Some(cid.into()),
            url: Some(url.into()),
            method: Some(method.into()),
        }
    }

    fn steps(&self) -> JcliResult<Vec<WizardStep>> {
        let cid = require_id_opt(self.cid.as_deref(), "cid")?;
        let url = require_opt(self.url.as_deref(), "url")?;
        let method = require_opt(self.method.as_deref(), "method")?;

        if !method.eq_ignore_ascii_case("GET") && !method.eq_ignore_ascii_case("POST") {
            return Err(JcliError::Validation(format!(
                "method must be GET or POST, got {method}"
            )));
        }

        Ok(vec![
            WizardStep::new("cid", cid)?,
            WizardStep::new("url", url)?,
            WizardStep::new("method", method.to_ascii_lowercase())?,
        ])
    }
}

pub trait HttpConnectorManager {
    async fn list_http_connectors(&mut self) -> JcliResult<Vec<HttpConnector>>;
    async fn get_http_connector(&mut self, cid: &str) -> JcliResult<HttpConnector>;
    async fn create_http_connector(&mut self, connector: &NewHttpConnector) -> JcliResult<HttpConnector>;
    async fn remove_http_connector(&mut self, cid: &str) -> JcliResult<()>;
}

impl<D: CommandDriver> HttpConnectorManager for D {
    async fn list_http_connectors(&mut self) -> JcliResult<Vec<HttpConnector>> {
        let rows = list_rows(self, ResourceKind::HttpConnector).await?;

        let mut connectors = Vec::with_capacity(rows.len());
        for row in &rows {
            match fetch_config(self, row.id()).await {
                Ok(config) => connectors.push(HttpConnector::from_row(row, config)),
                Err(JcliError::NotFound { id, .. }) => debug!("Connector {id} vanished while listing"),
                Err(e) => return Err(e),
            }
        }
        Ok(connectors)
    }

    async fn get_http_connector(&mut self, cid: &str) -> JcliResult<HttpConnector> {
        let cid = require_id(cid, "cid")?;
        let config = fetch_config(self, cid).await?;

        let rows = list_rows(self, ResourceKind::HttpConnector).await?;
        rows.iter()
            .find(|row| row.id() == cid)
            .map(|row| HttpConnector::from_row(row, config))
            .ok_or_else(|| JcliError::not_found(ResourceKind::HttpConnector, cid))
    }

    async fn create_http_connector(&mut self, connector: &NewHttpConnector) -> JcliResult<HttpConnector> {
        let steps = connector.steps()?;
        let cid = require_id_opt(connector.cid.as_deref(), "cid")?;

        open_add(self, ResourceKind::HttpConnector, BANNER).await?;
        wizard::run(self, &steps).await?;
        self.persist().await?;

        info!("Created HTTP connector {cid}");
        self.get_http_connector(cid).await
    }

    async fn remove_http_connector(&mut self, cid: &str) -> JcliResult<()> {
        run_action(self, ResourceKind::HttpConnector, Action::Remove, cid, UNKNOWN).await?;
        info!("Removed HTTP connector {cid}");
        Ok(())
    }
}

async fn fetch_config<D: CommandDriver>(driver: &mut D, cid: &str) -> JcliResult<BTreeMap<String, String>> {
    let text = show(driver, ResourceKind::HttpConnector, cid, UNKNOWN).await?;
    Ok(parse_attribute_block_lossy(detail_lines(&text)).into_flat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedDriver;

    const LISTING: &str = "httpccm -l\r\n\
        #Httpcc id        Type                   Method URL\r\n\
        #http_default     HttpConnector          GET    http://127.0.0.1/send\r\n\
        Total Httpccs: 1\r\n\
        jcli : ";

    #[tokio::test]
    async fn test_list_http_connectors() {
        let mut driver = ScriptedDriver::new()
            .reply(LISTING)
            .reply("httpccm -s http_default\r\ncid http_default\r\nmethod GET\r\njcli : ");

        let connectors = driver.list_http_connectors().await.unwrap();

        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].connector_type, "HttpConnector");
        assert_eq!(connectors[0].url, "http://127.0.0.1/send");

        let json = serde_json::to_value(&connectors[0]).unwrap();
        assert_eq!(json["type"], "HttpConnector");
        assert_eq!(json["config"]["method"], "GET");
    }

    #[tokio::test]
    async fn test_method_is_checked_before_talking() {
        let mut driver = ScriptedDriver::new();
        let request = NewHttpConnector::new("h1", "http://example.org", "PUT");

        let err = driver.create_http_connector(&request).await.unwrap_err();

        assert!(matches!(err, JcliError::Validation(_)));
        assert!(driver.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_url() {
        let mut driver = ScriptedDriver::new();
        let request = NewHttpConnector {
            cid: Some("h1".to_string()),
            url: None,
            method: Some("GET".to_string()),
        };
        let err = driver.create_http_connector(&request).await.unwrap_err();
        assert!(matches!(err, JcliError::MissingParameter(ref p) if p == "url"));
    }

    #[tokio::test]
    async fn test_create_http_connector() {
        let mut driver = ScriptedDriver::new()
            .reply("httpccm -a\r\nAdding a new Httpcc: (ok: save, ko: exit)\r\n> ")
            .reply("cid http_default\r\n> ")
            .reply("url http://127.0.0.1/send\r\n> ")
            .reply("method get\r\n> ")
            .reply("ok\r\nSuccessfully added Httpcc [HttpConnector] with cid:http_default\r\njcli : ")
            .reply("persist\r\nhttpcc configuration persisted (profile:jcli-prod)\r\njcli : ")
            .reply("httpccm -s http_default\r\ncid http_default\r\njcli : ")
            .reply(LISTING);

        let request = NewHttpConnector::new("http_default", "http://127.0.0.1/send", "Get");
        let connector = driver.create_http_connector(&request).await.unwrap();

        assert_eq!(connector.method, "GET");
        assert_eq!(driver.sent()[3], "method get");
    }

    #[tokio::test]
    async fn test_remove_unknown_http_connector() {
        let mut driver =
            ScriptedDriver::new().reply("httpccm -r nope\r\nUnknown Httpcc: nope\r\njcli : ");
        let err = driver.remove_http_connector("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown HTTP connector: nope");
    }
}
