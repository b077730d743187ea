// ABOUTME: Multi-step interactive dialogs used to create and update console entities
// ABOUTME: Each step must be answered by the interactive prompt; the first other reply aborts the wizard

//! Wizard dialogs
//!
//! `<cmd> -a` and `<cmd> -u <id>` switch the console to the interactive
//! prompt. Every following line sets one attribute, either `key value` or
//! `category subcategory key value`, and the console answers with the
//! interactive prompt again when it accepted the line. `ok` closes the
//! dialog and returns to the standard prompt.
//!
//! The console has no rollback. When a step is rejected the wizard aborts on
//! the spot with the console's own message; callers propagate the error with
//! `?`, so nothing after the failed step (the completion sentinel, `persist`,
//! the re-fetch) is ever sent.

use crate::client::classify::{Context, classify};
use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::{CommandDriver, PromptState};
use crate::expect::{Expect, OutcomeTag, Prompt};
use tracing::{debug, warn};

/// Line that completes a wizard
pub const COMPLETION: &str = "ok";

/// One line of a wizard dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardStep {
    tokens: Vec<String>,
}

impl WizardStep {
    /// `key value`
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> JcliResult<Self> {
        Self::from_tokens([key.into(), value.into()])
    }

    /// `category subcategory key value`
    pub fn nested(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> JcliResult<Self> {
        Self::from_tokens([category.into(), subcategory.into(), key.into(), value.into()])
    }

    /// Arbitrary tokens, as used by bulk updates.
    ///
    /// Blank tokens and tokens containing a line break are rejected with
    /// [`JcliError::Validation`]; a step is always exactly one console line.
    pub fn from_tokens<I, S>(tokens: I) -> JcliResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(JcliError::Validation("empty wizard step".to_string()));
        }
        if let Some(bad) = tokens
            .iter()
            .find(|t| t.trim().is_empty() || t.contains(['\r', '\n']))
        {
            return Err(JcliError::Validation(format!(
                "invalid wizard token {bad:?} in {tokens:?}"
            )));
        }
        Ok(Self { tokens })
    }

    pub fn key(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }

    /// The line sent to the console
    pub fn line(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Enter a wizard with `command`.
///
/// `expect` is the call site's list for the opening reply; its success entry
/// must end on the interactive prompt.
pub async fn open<D: CommandDriver>(
    driver: &mut D,
    command: &str,
    expect: &Expect,
    context: &Context,
) -> JcliResult<()> {
    let reply = driver.execute(command, expect).await?;
    classify(&reply, context).into_result()?;

    if driver.state() != PromptState::Wizard {
        return Err(JcliError::InvalidState(format!(
            "{command} did not open a wizard"
        )));
    }
    Ok(())
}

/// Send every step, then the completion sentinel.
///
/// Fails with [`JcliError::WizardSyntax`] carrying the console's message on
/// the first rejected step or a rejected completion.
pub async fn run<D: CommandDriver>(driver: &mut D, steps: &[WizardStep]) -> JcliResult<()> {
    if driver.state() != PromptState::Wizard {
        return Err(JcliError::InvalidState("no wizard in progress".to_string()));
    }

    let step_expect = Expect::new()
        .validation(r"(Unknown [^\r\n]*).*", Prompt::Interactive)
        .validation(r"([^\r\n]*can not be modified[^\r\n]*).*", Prompt::Interactive)
        .validation(r"(Error:.*)", Prompt::Standard)
        .success(r".*", Prompt::Interactive)
        .failure(r"(.*)", Prompt::Standard);

    for (position, step) in steps.iter().enumerate() {
        let reply = driver.execute(&step.line(), &step_expect).await?;
        if reply.tag != OutcomeTag::Success {
            let message = reply.message();
            warn!("Wizard aborted at step {} ({}): {message}", position + 1, step.key());
            return Err(JcliError::WizardSyntax(message));
        }
    }

    let completion_expect = Expect::new()
        .validation(r"(Error:.*)", Prompt::Standard)
        .validation(r"(.*)", Prompt::Interactive)
        .success(r".*", Prompt::Standard);

    let reply = driver.execute(COMPLETION, &completion_expect).await?;
    if reply.tag != OutcomeTag::Success {
        let message = reply.message();
        warn!("Wizard completion rejected: {message}");
        return Err(JcliError::WizardSyntax(message));
    }

    debug!("Wizard completed after {} steps", steps.len());
    Ok(())
}
