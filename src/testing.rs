//! Scripted command driver for unit tests

use crate::client::error::{JcliError, JcliResult};
use crate::client::traits::{CommandDriver, PromptState};
use crate::expect::{Expect, Match, Prompts};
use std::collections::VecDeque;

/// Replays canned console replies in order and records every line sent.
///
/// A reply that matches none of the caller's expect entries behaves like a
/// console that never printed a recognised prompt: the call times out.
#[derive(Debug)]
pub struct ScriptedDriver {
    prompts: Prompts,
    state: PromptState,
    replies: VecDeque<String>,
    sent: Vec<String>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self {
            prompts: Prompts::default(),
            state: PromptState::Standard,
            replies: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    pub fn in_wizard(mut self) -> Self {
        self.state = PromptState::Wizard;
        self
    }

    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.replies.push_back(text.into());
        self
    }

    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl CommandDriver for ScriptedDriver {
    fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    fn state(&self) -> PromptState {
        self.state
    }

    async fn execute(&mut self, line: &str, expect: &Expect) -> JcliResult<Match> {
        self.sent.push(line.to_string());
        let reply = self.replies.pop_front().ok_or(JcliError::Timeout)?;
        let found = expect
            .compile(&self.prompts)?
            .find(&reply)
            .ok_or(JcliError::Timeout)?;
        self.state = found.prompt.into();
        Ok(found)
    }
}
