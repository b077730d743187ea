//! Resource managers
//!
//! One manager trait per console resource, each blanket-implemented for every
//! [`CommandDriver`], so a live [`Session`](crate::client::Session) gets all of
//! them:
//!
//! | Trait | Console command |
//! |---|---|
//! | [`GroupManager`] | `group` |
//! | [`UserManager`] | `user` |
//! | [`MoRouterManager`] | `morouter` |
//! | [`MtRouterManager`] | `mtrouter` |
//! | [`SmppConnectorManager`] | `smppccm` |
//! | [`HttpConnectorManager`] | `httpccm` |
//! | [`FilterManager`] | `filter` |
//!
//! Every mutating operation that succeeds sends `persist` exactly once.

pub mod filter;
pub mod group;
pub mod httpccm;
pub mod router;
pub mod smppccm;
pub mod user;

pub use filter::{Filter, FilterManager, NewFilter};
pub use group::{Group, GroupManager};
pub use httpccm::{HttpConnector, HttpConnectorManager, NewHttpConnector};
pub use router::{Direction, MoRouterManager, MtRouterManager, NewRouter, Router};
pub use smppccm::{NewSmppConnector, SmppConnector, SmppConnectorManager};
pub use user::{NewUser, User, UserManager};

use crate::client::classify::{Context, classify};
use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::CommandDriver;
use crate::client::wizard;
use crate::expect::{Expect, Prompt, squash};
use crate::response::{TableRow, parse_table};
use serde::Serialize;
use std::fmt;

/// Console resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Group,
    User,
    MoRoute,
    MtRoute,
    SmppConnector,
    HttpConnector,
    Filter,
}

impl ResourceKind {
    /// Console command managing this kind
    pub fn command(&self) -> &'static str {
        match self {
            ResourceKind::Group => "group",
            ResourceKind::User => "user",
            ResourceKind::MoRoute => "morouter",
            ResourceKind::MtRoute => "mtrouter",
            ResourceKind::SmppConnector => "smppccm",
            ResourceKind::HttpConnector => "httpccm",
            ResourceKind::Filter => "filter",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Group => "group",
            ResourceKind::User => "user",
            ResourceKind::MoRoute => "MO route",
            ResourceKind::MtRoute => "MT route",
            ResourceKind::SmppConnector => "SMPP connector",
            ResourceKind::HttpConnector => "HTTP connector",
            ResourceKind::Filter => "filter",
        };
        f.write_str(label)
    }
}

/// Enabled/disabled flag shown by the `!` row marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Enabled,
    Disabled,
}

impl Status {
    pub fn from_row(row: &TableRow) -> Self {
        if row.disabled {
            Status::Disabled
        } else {
            Status::Enabled
        }
    }
}

/// Single-identifier console actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Remove,
    Enable,
    Disable,
    Start,
    Stop,
    SmppUnbind,
    SmppBan,
}

impl Action {
    pub fn flag(&self) -> &'static str {
        match self {
            Action::Remove => "-r",
            Action::Enable => "-e",
            Action::Disable => "-d",
            Action::Start => "-1",
            Action::Stop => "-0",
            Action::SmppUnbind => "--smpp-unbind",
            Action::SmppBan => "--smpp-ban",
        }
    }

    /// Whether the action changes stored configuration (and so needs `persist`)
    pub fn mutates(&self) -> bool {
        matches!(self, Action::Remove | Action::Enable | Action::Disable)
    }
}

/// Run `<cmd> <flag> <id>` and classify the three-way reply.
///
/// `unknown` is the literal the console prints before an unknown identifier
/// for this command.
pub(crate) async fn run_action<D: CommandDriver>(
    driver: &mut D,
    kind: ResourceKind,
    action: Action,
    id: &str,
    unknown: &str,
) -> JcliResult<String> {
    require_id(id, "identifier")?;

    let expect = Expect::new()
        .success(r"Successfully(.+)", Prompt::Standard)
        .not_found(format!("{}.*", regex::escape(unknown)), Prompt::Standard)
        .failure(r"(.*)", Prompt::Standard);

    let command = format!("{} {} {}", kind.command(), action.flag(), id);
    let reply = driver.execute(&command, &expect).await?;
    let text = classify(&reply, &Context::new(kind, id)).into_result()?;

    if action.mutates() {
        driver.persist().await?;
    }
    Ok(squash(&text))
}

/// Run `<cmd> -l` and parse the listing
pub(crate) async fn list_rows<D: CommandDriver>(
    driver: &mut D,
    kind: ResourceKind,
) -> JcliResult<Vec<TableRow>> {
    let expect = Expect::new().success(r".*", Prompt::Standard);
    let reply = driver.execute(&format!("{} -l", kind.command()), &expect).await?;
    Ok(parse_table(&reply.transcript))
}

/// Run `<cmd> -s <id>` and return the raw detail text
pub(crate) async fn show<D: CommandDriver>(
    driver: &mut D,
    kind: ResourceKind,
    id: &str,
    unknown: &str,
) -> JcliResult<String> {
    require_id(id, "identifier")?;

    let expect = Expect::new()
        .not_found(format!("{}.*", regex::escape(unknown)), Prompt::Standard)
        .failure(r"(Usage:.*)", Prompt::Standard)
        .success(r"(.*)", Prompt::Standard);

    let reply = driver
        .execute(&format!("{} -s {}", kind.command(), id), &expect)
        .await?;
    classify(&reply, &Context::new(kind, id)).into_result()
}

/// Run `<cmd> -a` and wait for the wizard banner
pub(crate) async fn open_add<D: CommandDriver>(
    driver: &mut D,
    kind: ResourceKind,
    banner: &str,
) -> JcliResult<()> {
    let expect = Expect::new()
        .success(format!("{}.*", regex::escape(banner)), Prompt::Interactive)
        .failure(r"(.*)", Prompt::Interactive)
        .failure(r"(.*)", Prompt::Standard);

    let command = format!("{} -a", kind.command());
    wizard::open(driver, &command, &expect, &Context::new(kind, "")).await
}

/// Run `<cmd> -u <id>` and wait for the update banner
pub(crate) async fn open_update<D: CommandDriver>(
    driver: &mut D,
    kind: ResourceKind,
    id: &str,
    banner: &str,
    unknown: &str,
) -> JcliResult<()> {
    let expect = Expect::new()
        .success(format!("{}.*", regex::escape(banner)), Prompt::Interactive)
        .not_found(format!("{}.*", regex::escape(unknown)), Prompt::Standard)
        .failure(r"(.*)", Prompt::Interactive)
        .failure(r"(.*)", Prompt::Standard);

    let command = format!("{} -u {}", kind.command(), id);
    wizard::open(driver, &command, &expect, &Context::new(kind, id)).await
}

/// `value` trimmed, or `MissingParameter(name)` when absent or blank.
///
/// A value spanning several lines is a `Validation` error: everything here
/// ends up on a single console line.
pub(crate) fn require<'a>(value: &'a str, name: &str) -> JcliResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(JcliError::MissingParameter(name.to_string()));
    }
    if value.contains(['\r', '\n']) {
        return Err(JcliError::Validation(format!("{name} must not contain line breaks")));
    }
    Ok(value)
}

/// Like [`require`] for optional request fields
pub(crate) fn require_opt<'a>(value: Option<&'a str>, name: &str) -> JcliResult<&'a str> {
    require(value.unwrap_or_default(), name)
}

/// Like [`require`], for identifiers: the value must also be a single token
pub(crate) fn require_id<'a>(value: &'a str, name: &str) -> JcliResult<&'a str> {
    let value = require(value, name)?;
    if value.contains(char::is_whitespace) {
        return Err(JcliError::Validation(format!(
            "{name} must be a single token, got {value:?}"
        )));
    }
    Ok(value)
}

/// Like [`require_id`] for optional request fields
pub(crate) fn require_id_opt<'a>(value: Option<&'a str>, name: &str) -> JcliResult<&'a str> {
    require_id(value.unwrap_or_default(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedDriver;

    #[test]
    fn test_only_configuration_changes_persist() {
        assert!(Action::Remove.mutates());
        assert!(Action::Disable.mutates());
        assert!(!Action::Start.mutates());
        assert!(!Action::SmppBan.mutates());
    }

    #[tokio::test]
    async fn test_action_persists_once_on_success() {
        let mut driver = ScriptedDriver::new()
            .reply("group -e g1\r\nSuccessfully enabled Group id:g1\r\njcli : ")
            .reply("persist\r\ngroup configuration persisted (profile:jcli-prod)\r\njcli : ");

        let text = run_action(&mut driver, ResourceKind::Group, Action::Enable, "g1", "Unknown Group: ")
            .await
            .unwrap();

        assert_eq!(text, "enabled Group id:g1");
        assert_eq!(driver.sent(), ["group -e g1", "persist"]);
    }

    #[tokio::test]
    async fn test_runtime_action_does_not_persist() {
        let mut driver =
            ScriptedDriver::new().reply("smppccm -1 c1\r\nSuccessfully started connector id:c1\r\njcli : ");

        run_action(&mut driver, ResourceKind::SmppConnector, Action::Start, "c1", "Unknown connector: ")
            .await
            .unwrap();

        assert_eq!(driver.sent(), ["smppccm -1 c1"]);
    }

    #[tokio::test]
    async fn test_action_not_found_skips_persist() {
        let mut driver = ScriptedDriver::new().reply("group -r nope\r\nUnknown Group: nope\r\njcli : ");

        let err = run_action(&mut driver, ResourceKind::Group, Action::Remove, "nope", "Unknown Group: ")
            .await
            .unwrap_err();

        assert!(matches!(err, JcliError::NotFound { kind: ResourceKind::Group, ref id } if id == "nope"));
        assert_eq!(driver.sent(), ["group -r nope"]);
    }

    #[tokio::test]
    async fn test_action_other_reply_is_generic_failure() {
        let mut driver =
            ScriptedDriver::new().reply("smppccm -1 c1\r\nFailed starting connector, check log for details\r\njcli : ");

        let err = run_action(&mut driver, ResourceKind::SmppConnector, Action::Start, "c1", "Unknown connector: ")
            .await
            .unwrap_err();

        assert!(matches!(err, JcliError::GenericFailure(ref m) if m.ends_with("check log for details")));
    }

    #[tokio::test]
    async fn test_failed_persist_is_reported() {
        let mut driver = ScriptedDriver::new()
            .reply("group -d g1\r\nSuccessfully disabled Group id:g1\r\njcli : ")
            .reply("persist\r\nCannot write profile\r\njcli : ");

        let err = run_action(&mut driver, ResourceKind::Group, Action::Disable, "g1", "Unknown Group: ")
            .await
            .unwrap_err();
        assert!(matches!(err, JcliError::GenericFailure(ref m) if m == "Cannot write profile"));
    }

    #[tokio::test]
    async fn test_blank_identifier_never_reaches_console() {
        let mut driver = ScriptedDriver::new();
        let err = run_action(&mut driver, ResourceKind::Filter, Action::Remove, "  ", "Unknown Filter: ")
            .await
            .unwrap_err();
        assert!(matches!(err, JcliError::MissingParameter(_)));
        assert!(driver.sent().is_empty());
    }

    #[tokio::test]
    async fn test_identifier_echo_cannot_pass_for_success() {
        let mut driver = ScriptedDriver::new()
            .reply("group -r Successfully\r\nUnknown Group: Successfully\r\njcli : ");

        let err = run_action(&mut driver, ResourceKind::Group, Action::Remove, "Successfully", "Unknown Group: ")
            .await
            .unwrap_err();

        assert!(matches!(err, JcliError::NotFound { ref id, .. } if id == "Successfully"));
        assert_eq!(driver.sent(), ["group -r Successfully"]);
    }

    #[tokio::test]
    async fn test_show_echo_cannot_pass_for_usage_error() {
        let mut driver =
            ScriptedDriver::new().reply("httpccm -s Usage:1\r\nmethod GET\r\njcli : ");

        let text = show(&mut driver, ResourceKind::HttpConnector, "Usage:1", "Unknown Httpcc: ")
            .await
            .unwrap();
        assert_eq!(text, "method GET\r\n");
    }

    #[tokio::test]
    async fn test_multi_line_identifier_never_reaches_console() {
        let mut driver = ScriptedDriver::new();
        let err = run_action(
            &mut driver,
            ResourceKind::Group,
            Action::Remove,
            "g1\r\nuser -r admin",
            "Unknown Group: ",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, JcliError::Validation(_)));
        assert!(driver.sent().is_empty());
    }

    #[test]
    fn test_identifiers_are_single_tokens() {
        assert_eq!(require_id(" g1 ", "gid").unwrap(), "g1");
        assert!(matches!(require_id("a b", "gid"), Err(JcliError::Validation(_))));
        assert!(matches!(require_id("a\tb", "gid"), Err(JcliError::Validation(_))));
        assert!(matches!(require_id("", "gid"), Err(JcliError::MissingParameter(_))));
        // free-text values may hold spaces but never line breaks
        assert_eq!(require("Unknown caller", "short_message").unwrap(), "Unknown caller");
        assert!(matches!(require("a\nb", "url"), Err(JcliError::Validation(_))));
        assert!(matches!(require_opt(None, "rate"), Err(JcliError::MissingParameter(_))));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ResourceKind::MtRoute.command(), "mtrouter");
        assert_eq!(ResourceKind::HttpConnector.to_string(), "HTTP connector");
    }
}
