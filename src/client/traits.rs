// ABOUTME: Command driver trait using native async functions
// ABOUTME: Resource managers are written against this trait so any driver (live or scripted) can serve them

use crate::client::error::{JcliError, JcliResult};
use crate::expect::{Expect, Match, Prompt, Prompts};
use tracing::debug;

/// Prompt context of a console session
///
/// ```text
/// Disconnected --acquire--> Standard --`<cmd> -a`/`-u`--> Wizard
///      ^                      ^  |                          |
///      |                      |  +------ any command -------+ (stays or returns,
///      +------ release -------+                               decided by the prompt)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Disconnected,
    /// Idle at the standard prompt
    Standard,
    /// Inside a multi-step definition, at the interactive prompt
    Wizard,
}

impl From<Prompt> for PromptState {
    fn from(prompt: Prompt) -> Self {
        match prompt {
            Prompt::Standard => PromptState::Standard,
            Prompt::Interactive => PromptState::Wizard,
        }
    }
}

/// Sends command lines and waits for a recognised reply
///
/// Implemented by [`Session`](crate::client::Session) for live consoles.
pub trait CommandDriver {
    /// Prompt literals used to anchor reply patterns
    fn prompts(&self) -> &Prompts;

    /// Current prompt context
    fn state(&self) -> PromptState;

    /// Send `line` and block until the reply matches one entry of `expect`
    ///
    /// Entries are tried in order and the first match wins. The prompt that
    /// ended the matched reply becomes the new [`PromptState`].
    async fn execute(&mut self, line: &str, expect: &Expect) -> JcliResult<Match>;

    /// Commit the console's in-memory configuration to durable storage
    async fn persist(&mut self) -> JcliResult<()> {
        let expect = Expect::new()
            .success(r"(?i)(.*persisted.*)", Prompt::Standard)
            .failure(r"(.*)", Prompt::Standard);

        let reply = self.execute("persist", &expect).await?;
        if reply.index != 0 {
            return Err(JcliError::GenericFailure(reply.message()));
        }

        debug!("Configuration persisted");
        Ok(())
    }
}
