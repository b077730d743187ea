// ABOUTME: Filter management over the `filter` console command
// ABOUTME: Each filter type takes exactly one type-specific parameter key, except TransparentFilter

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::CommandDriver;
use crate::client::wizard::{self, WizardStep};
use crate::resources::{
    Action, ResourceKind, list_rows, open_add, require_id, require_id_opt, require_opt, run_action,
};
use crate::response::TableRow;
use serde::{Deserialize, Serialize};
use tracing::info;

const UNKNOWN: &str = "Unknown Filter: ";
const BANNER: &str = "Adding a new Filter";

/// Filter types and the wizard key carrying their parameter
const FILTER_TYPES: &[(&str, Option<&str>)] = &[
    ("TransparentFilter", None),
    ("ConnectorFilter", Some("cid")),
    ("UserFilter", Some("uid")),
    ("GroupFilter", Some("gid")),
    ("SourceAddrFilter", Some("source_addr")),
    ("DestinationAddrFilter", Some("destination_addr")),
    ("ShortMessageFilter", Some("short_message")),
    ("DateIntervalFilter", Some("dateInterval")),
    ("TimeIntervalFilter", Some("timeInterval")),
    ("TagFilter", Some("tag")),
    ("EvalPyFilter", Some("pyCode")),
];

/// Wizard key for `filter_type`'s parameter (case-insensitive lookup).
///
/// `Ok(None)` for filters without a parameter, `Validation` for unknown types.
pub fn parameter_key(filter_type: &str) -> JcliResult<Option<&'static str>> {
    FILTER_TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(filter_type))
        .map(|(_, key)| *key)
        .ok_or_else(|| JcliError::Validation(format!("Unknown filter type: {filter_type}")))
}

/// A filter as shown by `filter -l`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub fid: String,
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Router kinds the filter applies to (`MO`, `MT`)
    pub routes: Vec<String>,
    pub description: String,
}

impl Filter {
    fn from_row(row: &TableRow) -> Self {
        let routes: Vec<String> = row
            .columns
            .iter()
            .skip(2)
            .take_while(|token| matches!(token.as_str(), "MO" | "MT"))
            .cloned()
            .collect();
        let description = row.rest(2 + routes.len());

        Self {
            fid: row.id().to_string(),
            filter_type: row.column(1).unwrap_or_default().to_string(),
            routes,
            description,
        }
    }
}

/// Fields for `filter -a`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewFilter {
    pub fid: Option<String>,
    #[serde(rename = "type")]
    pub filter_type: Option<String>,
    /// Value for the type-specific key, see [`parameter_key`]
    pub parameter: Option<String>,
}

impl NewFilter {
    pub fn new(fid: impl Into<String>, filter_type: impl Into<String>) -> Self {
        Self {
            fid: Some(fid.into()),
            filter_type: Some(filter_type.into()),
            parameter: None,
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    fn steps(&self) -> JcliResult<Vec<WizardStep>> {
        let filter_type = require_opt(self.filter_type.as_deref(), "type")?;
        let fid = require_id_opt(self.fid.as_deref(), "fid")?;

        let mut steps = vec![
            WizardStep::new("type", filter_type.to_ascii_lowercase())?,
            WizardStep::new("fid", fid)?,
        ];
        if let Some(key) = parameter_key(filter_type)? {
            let value = require_opt(self.parameter.as_deref(), key)?;
            steps.push(WizardStep::new(key, value)?);
        }
        Ok(steps)
    }
}

pub trait FilterManager {
    async fn list_filters(&mut self) -> JcliResult<Vec<Filter>>;
    async fn get_filter(&mut self, fid: &str) -> JcliResult<Filter>;
    async fn create_filter(&mut self, filter: &NewFilter) -> JcliResult<Filter>;
    async fn remove_filter(&mut self, fid: &str) -> JcliResult<()>;
}

impl<D: CommandDriver> FilterManager for D {
    async fn list_filters(&mut self) -> JcliResult<Vec<Filter>> {
        let rows = list_rows(self, ResourceKind::Filter).await?;
        Ok(rows.iter().map(Filter::from_row).collect())
    }

    async fn get_filter(&mut self, fid: &str) -> JcliResult<Filter> {
        let fid = require_id(fid, "fid")?;
        self.list_filters()
            .await?
            .into_iter()
            .find(|filter| filter.fid == fid)
            .ok_or_else(|| JcliError::not_found(ResourceKind::Filter, fid))
    }

    async fn create_filter(&mut self, filter: &NewFilter) -> JcliResult<Filter> {
        let steps = filter.steps()?;
        let fid = require_id_opt(filter.fid.as_deref(), "fid")?;

        open_add(self, ResourceKind::Filter, BANNER).await?;
        wizard::run(self, &steps).await?;
        self.persist().await?;

        info!("Created filter {fid}");
        self.get_filter(fid).await
    }

    async fn remove_filter(&mut self, fid: &str) -> JcliResult<()> {
        run_action(self, ResourceKind::Filter, Action::Remove, fid, UNKNOWN).await?;
        info!("Removed filter {fid}");
        Ok(())
    }
}
