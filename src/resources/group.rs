// ABOUTME: Group management over the `group` console command
// ABOUTME: Groups carry only an identifier and an enabled/disabled flag

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::CommandDriver;
use crate::client::wizard::{self, WizardStep};
use crate::resources::{Action, ResourceKind, Status, list_rows, open_add, require_id, run_action};
use serde::Serialize;
use tracing::info;

const UNKNOWN: &str = "Unknown Group: ";
const BANNER: &str = "Adding a new Group";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    pub status: Status,
}

pub trait GroupManager {
    async fn list_groups(&mut self) -> JcliResult<Vec<Group>>;
    async fn get_group(&mut self, gid: &str) -> JcliResult<Group>;
    async fn create_group(&mut self, gid: &str) -> JcliResult<Group>;
    async fn remove_group(&mut self, gid: &str) -> JcliResult<()>;
    async fn enable_group(&mut self, gid: &str) -> JcliResult<Group>;
    async fn disable_group(&mut self, gid: &str) -> JcliResult<Group>;
}

impl<D: CommandDriver> GroupManager for D {
    async fn list_groups(&mut self) -> JcliResult<Vec<Group>> {
        let rows = list_rows(self, ResourceKind::Group).await?;
        Ok(rows
            .iter()
            .map(|row| Group {
                name: row.id().to_string(),
                status: Status::from_row(row),
            })
            .collect())
    }

    /// The console has no per-group view, so this searches the listing
    async fn get_group(&mut self, gid: &str) -> JcliResult<Group> {
        let gid = require_id(gid, "gid")?;
        self.list_groups()
            .await?
            .into_iter()
            .find(|group| group.name == gid)
            .ok_or_else(|| JcliError::not_found(ResourceKind::Group, gid))
    }

    async fn create_group(&mut self, gid: &str) -> JcliResult<Group> {
        let gid = require_id(gid, "gid")?;

        open_add(self, ResourceKind::Group, BANNER).await?;
        wizard::run(self, &[WizardStep::new("gid", gid)?]).await?;
        self.persist().await?;

        info!("Created group {gid}");
        self.get_group(gid).await
    }

    async fn remove_group(&mut self, gid: &str) -> JcliResult<()> {
        run_action(self, ResourceKind::Group, Action::Remove, gid, UNKNOWN).await?;
        info!("Removed group {gid}");
        Ok(())
    }

    async fn enable_group(&mut self, gid: &str) -> JcliResult<Group> {
        run_action(self, ResourceKind::Group, Action::Enable, gid, UNKNOWN).await?;
        self.get_group(gid).await
    }

    async fn disable_group(&mut self, gid: &str) -> JcliResult<Group> {
        run_action(self, ResourceKind::Group, Action::Disable, gid, UNKNOWN).await?;
        self.get_group(gid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedDriver;

    const LISTING: &str = "group -l\r\n#Group id\r\n#g1\r\n#!g2\r\nTotal Groups: 2\r\njcli : ";

    #[tokio::test]
    async fn test_list_groups() {
        let mut driver = ScriptedDriver::new().reply(LISTING);
        let groups = driver.list_groups().await.unwrap();

        assert_eq!(
            groups,
            vec![
                Group { name: "g1".to_string(), status: Status::Enabled },
                Group { name: "g2".to_string(), status: Status::Disabled },
            ]
        );
        assert_eq!(driver.sent(), ["group -l"]);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let mut driver = ScriptedDriver::new().reply("group -l\r\nTotal Groups: 0\r\njcli : ");
        assert!(driver.list_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_group() {
        let mut driver = ScriptedDriver::new().reply(LISTING);
        let err = driver.get_group("g9").await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown group: g9");
    }

    #[tokio::test]
    async fn test_create_group_runs_wizard_then_persists() {
        let mut driver = ScriptedDriver::new()
            .reply("group -a\r\nAdding a new Group: (ok: save, ko: exit)\r\n> ")
            .reply("gid g3\r\n> ")
            .reply("ok\r\nSuccessfully added Group [g3]\r\njcli : ")
            .reply("persist\r\ngroup configuration persisted (profile:jcli-prod)\r\njcli : ")
            .reply("group -l\r\n#Group id\r\n#g3\r\nTotal Groups: 1\r\njcli : ");

        let group = driver.create_group("g3").await.unwrap();

        assert_eq!(group.name, "g3");
        assert_eq!(group.status, Status::Enabled);
        assert_eq!(driver.sent(), ["group -a", "gid g3", "ok", "persist", "group -l"]);
    }

    #[tokio::test]
    async fn test_create_group_requires_gid() {
        let mut driver = ScriptedDriver::new();
        let err = driver.create_group("").await.unwrap_err();
        assert!(matches!(err, JcliError::MissingParameter(ref p) if p == "gid"));
        assert!(driver.sent().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_gid_never_persists() {
        let mut driver = ScriptedDriver::new()
            .reply("group -a\r\nAdding a new Group: (ok: save, ko: exit)\r\n> ")
            .reply("gid bad id\r\nError: gid syntax is invalid\r\njcli : ");

        let err = driver.create_group("bad id").await.unwrap_err();

        assert!(matches!(err, JcliError::WizardSyntax(_)));
        assert!(!driver.sent().iter().any(|line| line == "persist"));
    }

    #[tokio::test]
    async fn test_disable_group_returns_refreshed_view() {
        let mut driver = ScriptedDriver::new()
            .reply("group -d g2\r\nSuccessfully disabled Group id:g2\r\njcli : ")
            .reply("persist\r\ngroup configuration persisted (profile:jcli-prod)\r\njcli : ")
            .reply(LISTING);

        let group = driver.disable_group("g2").await.unwrap();
        assert_eq!(group.status, Status::Disabled);
        assert_eq!(driver.remaining(), 0);
    }

    #[tokio::test]
    async fn test_remove_unknown_group() {
        let mut driver = ScriptedDriver::new().reply("group -r g9\r\nUnknown Group: g9\r\njcli : ");
        let err = driver.remove_group("g9").await.unwrap_err();
        assert!(matches!(err, JcliError::NotFound { ref id, .. } if id == "g9"));
    }
}
