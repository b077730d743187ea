// ABOUTME: Live console session: connect, authenticate, drive commands, release
// ABOUTME: One session per logical operation, never pooled or shared

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::{CommandDriver, PromptState};
use crate::client::types::SessionConfig;
use crate::connection::Connection;
use crate::expect::{Expect, Match, Prompts};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, info, warn};

const USERNAME_PROMPT: &str = "Username: ";
const PASSWORD_PROMPT: &str = "Password: ";

/// Authenticated console session
///
/// A session is owned by exactly one operation. It is created with
/// [`Session::acquire`], used through [`CommandDriver`], and torn down with
/// [`Session::release`]; [`Session::scoped`] bundles the three so the release
/// happens on every exit path. Dropping a session without releasing it closes
/// the socket as its `TcpStream` goes out of scope, but never sends `quit`.
///
/// ```rust,no_run
/// use jcli::client::{Session, SessionConfig};
/// use jcli::resources::GroupManager;
///
/// # async fn example() -> Result<(), jcli::client::JcliError> {
/// let config = SessionConfig::default();
/// let groups = Session::scoped(&config, async |session| session.list_groups().await).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    connection: Connection,
    config: SessionConfig,
    state: PromptState,
}

impl Session {
    /// Connect and log in.
    ///
    /// Any failure to reach the standard prompt (refused connection, timeout,
    /// rejected credentials) is reported as
    /// [`ServiceUnavailable`](JcliError::ServiceUnavailable).
    pub async fn acquire(config: &SessionConfig) -> JcliResult<Session> {
        let address = config.address();
        info!("Connecting to console at {address}");

        let socket = match time::timeout(config.connect_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(socket)) => socket,
            Ok(Err(e)) => {
                return Err(JcliError::ServiceUnavailable(format!(
                    "cannot connect to {address}: {e}"
                )));
            }
            Err(_) => {
                return Err(JcliError::ServiceUnavailable(format!(
                    "connection to {address} timed out"
                )));
            }
        };

        let mut session = Session {
            connection: Connection::new(socket),
            config: config.clone(),
            state: PromptState::Disconnected,
        };

        session.login().await.map_err(|e| match e {
            JcliError::ServiceUnavailable(_) => e,
            other => JcliError::ServiceUnavailable(format!("login to {address} failed: {other}")),
        })?;

        info!(
            "Authenticated to console at {address} as {}",
            session.config.credentials.username
        );
        Ok(session)
    }

    /// Acquire a session, run `op` on it and release it whatever `op` returned
    pub async fn scoped<T, F>(config: &SessionConfig, op: F) -> JcliResult<T>
    where
        F: AsyncFnOnce(&mut Session) -> JcliResult<T>,
    {
        let mut session = Session::acquire(config).await?;
        let result = op(&mut session).await;
        if let Err(e) = session.release().await {
            warn!("Session release failed: {e}");
        }
        result
    }

    /// Leave the console and close the transport
    pub async fn release(mut self) -> JcliResult<()> {
        if self.state == PromptState::Disconnected {
            return Ok(());
        }
        self.state = PromptState::Disconnected;

        if let Err(e) = self.connection.write_line("quit").await {
            debug!("quit not delivered: {e}");
        }
        self.connection.shutdown().await?;
        info!("Console session released");
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn login(&mut self) -> JcliResult<()> {
        self.wait_for_ending(&[USERNAME_PROMPT]).await?;
        let username = self.config.credentials.username.clone();
        self.connection.write_line(&username).await?;

        self.wait_for_ending(&[PASSWORD_PROMPT]).await?;
        let password = self.config.credentials.password.clone();
        self.connection.write_line(&password).await?;

        let standard = self.config.prompts.standard.clone();
        match self.wait_for_ending(&[standard.as_str(), USERNAME_PROMPT]).await? {
            0 => {
                self.state = PromptState::Standard;
                Ok(())
            }
            _ => Err(JcliError::ServiceUnavailable(format!(
                "console rejected credentials for {username}"
            ))),
        }
    }

    /// Wait until the unconsumed text ends with one of `endings`, consume it
    /// and return the index of the ending
    async fn wait_for_ending(&mut self, endings: &[&str]) -> JcliResult<usize> {
        self.wait(|text| {
            endings
                .iter()
                .position(|ending| text.ends_with(ending))
                .map(|index| (index, text.len()))
        })
        .await
    }

    /// Read until `recognise` accepts the buffered text, bounded by the
    /// command timeout. `recognise` returns the value and how many bytes of
    /// text it used up.
    async fn wait<T>(&mut self, mut recognise: impl FnMut(&str) -> Option<(T, usize)>) -> JcliResult<T> {
        let limit = self.config.timeout;
        let connection = &mut self.connection;

        let exchange = async move {
            loop {
                if let Some((value, used)) = recognise(connection.text()) {
                    connection.consume(used);
                    return Ok(value);
                }
                match connection.read_chunk().await {
                    Ok(0) => return Err(JcliError::ConnectionClosed),
                    Ok(_) => {}
                    Err(e) => return Err(JcliError::Connection(e)),
                }
            }
        };

        match time::timeout(limit, exchange).await {
            Ok(result) => result,
            Err(_) => Err(JcliError::Timeout),
        }
    }
}

impl CommandDriver for Session {
    fn prompts(&self) -> &Prompts {
        &self.config.prompts
    }

    fn state(&self) -> PromptState {
        self.state
    }

    async fn execute(&mut self, line: &str, expect: &Expect) -> JcliResult<Match> {
        if self.state == PromptState::Disconnected {
            return Err(JcliError::InvalidState("session is not connected".to_string()));
        }

        let matcher = expect.compile(&self.config.prompts)?;

        debug!("-> {}", redact(line));
        self.connection.write_line(line).await?;

        let reply = self
            .wait(|text| matcher.find(text).map(|found| {
                let end = found.end();
                (found, end)
            }))
            .await?;

        debug!("<- matched pattern {} ({:?})", reply.index, reply.tag);
        self.state = reply.prompt.into();
        Ok(reply)
    }
}

/// Mask secrets in a command line before it is logged
fn redact(line: &str) -> String {
    match line.split_once(' ') {
        Some((key, _)) if key.eq_ignore_ascii_case("password") => format!("{key} ********"),
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_password_lines() {
        assert_eq!(redact("password hunter2"), "password ********");
        assert_eq!(redact("username alice"), "username alice");
        assert_eq!(redact("ok"), "ok");
    }
}
