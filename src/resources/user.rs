// ABOUTME: User management over the `user` console command
// ABOUTME: Detail views are strict 2/4-token attribute blocks, updates are caller-driven wizards

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::CommandDriver;
use crate::client::wizard::{self, WizardStep};
use crate::resources::{
    Action, ResourceKind, Status, list_rows, open_add, open_update, require_id, require_id_opt,
    require_opt, run_action, show,
};
use crate::response::{AttributeTree, detail_lines, parse_attribute_block};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const UNKNOWN: &str = "Unknown User: ";
const ADD_BANNER: &str = "Adding a new User";
const UPDATE_BANNER: &str = "Updating User";

/// A user as shown by `user -s`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub uid: String,
    pub gid: String,
    pub username: String,
    pub status: Status,
    /// Everything else in the detail block (credentials, quotas, ...)
    pub attributes: AttributeTree,
}

/// Fields for `user -a`; all four are required
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub uid: Option<String>,
    pub gid: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl NewUser {
    pub fn new(
        uid: impl Into<String>,
        gid: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uid: Some(uid.into()),
            gid: Some(gid.into()),
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    fn steps(&self) -> JcliResult<Vec<WizardStep>> {
        Ok(vec![
            WizardStep::new("uid", require_id_opt(self.uid.as_deref(), "uid")?)?,
            WizardStep::new("gid", require_id_opt(self.gid.as_deref(), "gid")?)?,
            WizardStep::new("username", require_opt(self.username.as_deref(), "username")?)?,
            WizardStep::new("password", require_opt(self.password.as_deref(), "password")?)?,
        ])
    }
}

pub trait UserManager {
    /// Every user with its full detail block
    async fn list_users(&mut self) -> JcliResult<Vec<User>>;
    async fn get_user(&mut self, uid: &str) -> JcliResult<User>;
    async fn create_user(&mut self, user: &NewUser) -> JcliResult<User>;
    /// Apply `updates`, each a `key value` or `category subcategory key value`
    /// token list, in one update wizard
    async fn update_user(&mut self, uid: &str, updates: &[Vec<String>]) -> JcliResult<User>;
    async fn remove_user(&mut self, uid: &str) -> JcliResult<()>;
    async fn enable_user(&mut self, uid: &str) -> JcliResult<User>;
    async fn disable_user(&mut self, uid: &str) -> JcliResult<User>;
    /// Drop the user's live SMPP binds
    async fn smpp_unbind_user(&mut self, uid: &str) -> JcliResult<User>;
    /// Drop the user's live SMPP binds and refuse new ones
    async fn smpp_ban_user(&mut self, uid: &str) -> JcliResult<User>;
}

impl<D: CommandDriver> UserManager for D {
    async fn list_users(&mut self) -> JcliResult<Vec<User>> {
        let rows = list_rows(self, ResourceKind::User).await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            match fetch_user(self, row.id(), Status::from_row(row)).await {
                Ok(user) => users.push(user),
                // removed between the listing and the detail view
                Err(JcliError::NotFound { id, .. }) => debug!("User {id} vanished while listing"),
                Err(e) => return Err(e),
            }
        }
        Ok(users)
    }

    async fn get_user(&mut self, uid: &str) -> JcliResult<User> {
        let uid = require_id(uid, "uid")?;
        let mut user = fetch_user(self, uid, Status::Enabled).await?;

        let rows = list_rows(self, ResourceKind::User).await?;
        if let Some(row) = rows.iter().find(|row| row.id() == uid) {
            user.status = Status::from_row(row);
        }
        Ok(user)
    }

    async fn create_user(&mut self, user: &NewUser) -> JcliResult<User> {
        let steps = user.steps()?;
        let uid = require_id_opt(user.uid.as_deref(), "uid")?;

        open_add(self, ResourceKind::User, ADD_BANNER).await?;
        wizard::run(self, &steps).await?;
        self.persist().await?;

        info!("Created user {uid}");
        self.get_user(uid).await
    }

    async fn update_user(&mut self, uid: &str, updates: &[Vec<String>]) -> JcliResult<User> {
        let uid = require_id(uid, "uid")?;
        if updates.is_empty() {
            return Err(JcliError::MissingParameter("updates".to_string()));
        }
        let steps = updates
            .iter()
            .map(|tokens| WizardStep::from_tokens(tokens.iter().map(String::as_str)))
            .collect::<JcliResult<Vec<_>>>()?;

        open_update(self, ResourceKind::User, uid, UPDATE_BANNER, UNKNOWN).await?;
        wizard::run(self, &steps).await?;
        self.persist().await?;

        info!("Updated user {uid} ({} changes)", steps.len());
        self.get_user(uid).await
    }

    async fn remove_user(&mut self, uid: &str) -> JcliResult<()> {
        run_action(self, ResourceKind::User, Action::Remove, uid, UNKNOWN).await?;
        info!("Removed user {uid}");
        Ok(())
    }

    async fn enable_user(&mut self, uid: &str) -> JcliResult<User> {
        run_action(self, ResourceKind::User, Action::Enable, uid, UNKNOWN).await?;
        self.get_user(uid).await
    }

    async fn disable_user(&mut self, uid: &str) -> JcliResult<User> {
        run_action(self, ResourceKind::User, Action::Disable, uid, UNKNOWN).await?;
        self.get_user(uid).await
    }

    async fn smpp_unbind_user(&mut self, uid: &str) -> JcliResult<User> {
        run_action(self, ResourceKind::User, Action::SmppUnbind, uid, UNKNOWN).await?;
        self.get_user(uid).await
    }

    async fn smpp_ban_user(&mut self, uid: &str) -> JcliResult<User> {
        run_action(self, ResourceKind::User, Action::SmppBan, uid, UNKNOWN).await?;
        self.get_user(uid).await
    }
}

async fn fetch_user<D: CommandDriver>(driver: &mut D, uid: &str, status: Status) -> JcliResult<User> {
    let text = show(driver, ResourceKind::User, uid, UNKNOWN).await?;
    let mut attributes = parse_attribute_block(detail_lines(&text))?;

    Ok(User {
        uid: attributes.take_flat("uid").unwrap_or_else(|| uid.to_string()),
        gid: attributes.take_flat("gid").unwrap_or_default(),
        username: attributes.take_flat("username").unwrap_or_default(),
        status,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedDriver;

    const LISTING: &str = "user -l\r\n\
        #User id          Group id         Username         Balance MT SMS Throughput\r\n\
        #u1               g1               alice            ND      ND     ND/ND\r\n\
        #!u2              g1               bob              10.0    ND     ND/ND\r\n\
        Total Users: 2\r\n\
        jcli : ";

    fn detail(uid: &str, username: &str) -> String {
        format!(
            "user -s {uid}\r\nuid {uid}\r\ngid g1\r\nusername {username}\r\n\
             mt_messaging_cred quota balance ND\r\n\
             mt_messaging_cred authorization dlr_level True\r\njcli : "
        )
    }

    #[tokio::test]
    async fn test_list_merges_detail_and_status() {
        let mut driver = ScriptedDriver::new()
            .reply(LISTING)
            .reply(detail("u1", "alice"))
            .reply(detail("u2", "bob"));

        let users = driver.list_users().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].status, Status::Enabled);
        assert_eq!(users[1].status, Status::Disabled);
        assert_eq!(
            users[1].attributes.nested("mt_messaging_cred", "quota", "balance"),
            Some("ND")
        );
        assert_eq!(driver.sent(), ["user -l", "user -s u1", "user -s u2"]);
    }

    #[tokio::test]
    async fn test_list_skips_user_removed_meanwhile() {
        let mut driver = ScriptedDriver::new()
            .reply(LISTING)
            .reply("user -s u1\r\nUnknown User: u1\r\njcli : ")
            .reply(detail("u2", "bob"));

        let users = driver.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].uid, "u2");
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let mut driver = ScriptedDriver::new().reply("user -s ghost\r\nUnknown User: ghost\r\njcli : ");
        let err = driver.get_user("ghost").await.unwrap_err();
        assert!(matches!(err, JcliError::NotFound { kind: ResourceKind::User, ref id } if id == "ghost"));
    }

    #[tokio::test]
    async fn test_malformed_detail_is_a_parse_error() {
        let mut driver =
            ScriptedDriver::new().reply("user -s u1\r\nuid u1\r\nmt_messaging_cred quota ND\r\njcli : ");
        let err = driver.get_user("u1").await.unwrap_err();
        assert!(matches!(err, JcliError::Parse(_)));
    }

    #[tokio::test]
    async fn test_create_requires_every_field_before_talking() {
        let mut driver = ScriptedDriver::new();
        let user = NewUser {
            uid: Some("u3".to_string()),
            gid: Some("g1".to_string()),
            username: Some("carol".to_string()),
            password: None,
        };

        let err = driver.create_user(&user).await.unwrap_err();

        assert!(matches!(err, JcliError::MissingParameter(ref p) if p == "password"));
        assert!(driver.sent().is_empty());
    }

    #[tokio::test]
    async fn test_create_user() {
        let mut driver = ScriptedDriver::new()
            .reply("user -a\r\nAdding a new User: (ok: save, ko: exit)\r\n> ")
            .reply("uid u3\r\n> ")
            .reply("gid g1\r\n> ")
            .reply("username carol\r\n> ")
            .reply("password secret\r\n> ")
            .reply("ok\r\nSuccessfully added User [u3] to Group [g1]\r\njcli : ")
            .reply("persist\r\nuser configuration persisted (profile:jcli-prod)\r\njcli : ")
            .reply(detail("u3", "carol"))
            .reply("user -l\r\n#User id\r\n#u3 g1 carol ND ND ND/ND\r\nTotal Users: 1\r\njcli : ");

        let user = driver.create_user(&NewUser::new("u3", "g1", "carol", "secret")).await.unwrap();

        assert_eq!(user.uid, "u3");
        assert_eq!(user.gid, "g1");
        assert_eq!(
            &driver.sent()[..6],
            ["user -a", "uid u3", "gid g1", "username carol", "password secret", "ok"]
        );
        assert_eq!(driver.sent().iter().filter(|l| *l == "persist").count(), 1);
    }

    #[tokio::test]
    async fn test_update_validates_tokens_first() {
        let mut driver = ScriptedDriver::new();
        let err = driver
            .update_user("u1", &[vec!["gid".to_string(), "g2".to_string()], vec![]])
            .await
            .unwrap_err();
        assert!(matches!(err, JcliError::Validation(_)));
        assert!(driver.sent().is_empty());

        let err = driver.update_user("u1", &[]).await.unwrap_err();
        assert!(matches!(err, JcliError::MissingParameter(_)));
    }

    #[tokio::test]
    async fn test_update_abort_leaves_no_persist() {
        let mut driver = ScriptedDriver::new()
            .reply("user -u u1\r\nUpdating User id:u1: (ok: save, ko: exit)\r\n> ")
            .reply("mt_messaging_cred quota balance 100\r\n> ")
            .reply("uid u9\r\nuid can not be modified !\r\n> ");

        let updates = vec![
            vec!["mt_messaging_cred", "quota", "balance", "100"],
            vec!["uid", "u9"],
        ]
        .into_iter()
        .map(|tokens| tokens.into_iter().map(str::to_string).collect())
        .collect::<Vec<Vec<String>>>();

        let err = driver.update_user("u1", &updates).await.unwrap_err();

        assert!(matches!(err, JcliError::WizardSyntax(ref m) if m.contains("can not be modified")));
        assert_eq!(
            driver.sent(),
            ["user -u u1", "mt_messaging_cred quota balance 100", "uid u9"]
        );
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let mut driver = ScriptedDriver::new().reply("user -u ghost\r\nUnknown User: ghost\r\njcli : ");
        let err = driver
            .update_user("ghost", &[vec!["gid".to_string(), "g2".to_string()]])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown user: ghost");
    }

    #[tokio::test]
    async fn test_smpp_ban_does_not_persist() {
        let mut driver = ScriptedDriver::new()
            .reply("user --smpp-ban u1\r\nSuccessfully banned User id:u1\r\njcli : ")
            .reply(detail("u1", "alice"))
            .reply(LISTING);

        driver.smpp_ban_user("u1").await.unwrap();
        assert_eq!(driver.sent(), ["user --smpp-ban u1", "user -s u1", "user -l"]);
    }

    #[tokio::test]
    async fn test_user_serializes_attributes_inline() {
        let mut driver = ScriptedDriver::new().reply(detail("u1", "alice")).reply(LISTING);
        let user = driver.get_user("u1").await.unwrap();

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["status"], "enabled");
        assert_eq!(json["attributes"]["mt_messaging_cred"]["authorization"]["dlr_level"], "True");
    }
}
