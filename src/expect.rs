// ABOUTME: Ordered response patterns for the prompt-framed console protocol
// ABOUTME: Each call site lists (pattern, prompt, outcome) entries; the first entry to match wins

//! Response matching
//!
//! Console replies carry no status codes. The only way to tell success from
//! "unknown object" from "usage error" is the free text printed before the
//! prompt, and the same text can satisfy several patterns at once. An
//! [`Expect`] is therefore an *ordered* list and evaluation stops at the first
//! entry that matches, so lists are written most-specific-success first, then
//! not-found, then the catch-all failure.
//!
//! Every entry is anchored on the prompt that must end the buffer. A reply is
//! only complete once the console prints a prompt again, and which prompt it
//! prints (standard or interactive) is what drives the session state.
//!
//! The console echoes each command line before answering it. Bodies are
//! matched against the text after that first line only, so an identifier or
//! value that happens to contain `Successfully` or `Unknown` cannot satisfy
//! an entry on its own.
//!
//! ```rust
//! use jcli::expect::{Expect, OutcomeTag, Prompt, Prompts};
//!
//! let expect = Expect::new()
//!     .success(r"Successfully(.+)", Prompt::Standard)
//!     .not_found(r"Unknown Group: (.+)", Prompt::Standard)
//!     .failure(r"(.*)", Prompt::Standard);
//!
//! let matcher = expect.compile(&Prompts::default()).unwrap();
//! let found = matcher
//!     .find("group -r g1\r\nUnknown Group: g1\r\njcli : ")
//!     .unwrap();
//!
//! assert_eq!(found.index, 1);
//! assert_eq!(found.tag, OutcomeTag::NotFound);
//! ```

use crate::client::error::JcliResult;
use regex::Regex;

/// The two prompts framing every reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Top-level prompt, the console is idle
    Standard,
    /// Wizard prompt, a multi-step definition is in progress
    Interactive,
}

/// Prompt literals printed by the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub standard: String,
    pub interactive: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            standard: "jcli : ".to_string(),
            interactive: "> ".to_string(),
        }
    }
}

impl Prompts {
    pub fn literal(&self, prompt: Prompt) -> &str {
        match prompt {
            Prompt::Standard => &self.standard,
            Prompt::Interactive => &self.interactive,
        }
    }
}

/// What a matched entry means to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeTag {
    Success,
    NotFound,
    Validation,
    Failure,
}

#[derive(Debug, Clone)]
struct ExpectEntry {
    body: String,
    prompt: Prompt,
    tag: OutcomeTag,
}

/// Ordered list of expected replies for one command
#[derive(Debug, Clone, Default)]
pub struct Expect {
    entries: Vec<ExpectEntry>,
}

impl Expect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. `body` is a regex matched (dot-all) against the reply
    /// text between the echoed command line and `prompt`; its first capture
    /// group, if any, becomes [`Match::captured`].
    pub fn on(mut self, tag: OutcomeTag, body: impl Into<String>, prompt: Prompt) -> Self {
        self.entries.push(ExpectEntry {
            body: body.into(),
            prompt,
            tag,
        });
        self
    }

    pub fn success(self, body: impl Into<String>, prompt: Prompt) -> Self {
        self.on(OutcomeTag::Success, body, prompt)
    }

    pub fn not_found(self, body: impl Into<String>, prompt: Prompt) -> Self {
        self.on(OutcomeTag::NotFound, body, prompt)
    }

    pub fn validation(self, body: impl Into<String>, prompt: Prompt) -> Self {
        self.on(OutcomeTag::Validation, body, prompt)
    }

    pub fn failure(self, body: impl Into<String>, prompt: Prompt) -> Self {
        self.on(OutcomeTag::Failure, body, prompt)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compile every entry against the session's prompt literals
    pub fn compile(&self, prompts: &Prompts) -> JcliResult<Matcher> {
        let patterns = self
            .entries
            .iter()
            .map(|entry| {
                let source = format!(
                    r"(?s){}{}\z",
                    entry.body,
                    regex::escape(prompts.literal(entry.prompt))
                );
                let prompt_len = prompts.literal(entry.prompt).len();
                Ok(CompiledEntry {
                    regex: Regex::new(&source)?,
                    prompt: entry.prompt,
                    prompt_len,
                    tag: entry.tag,
                })
            })
            .collect::<JcliResult<Vec<_>>>()?;

        Ok(Matcher { patterns })
    }
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    regex: Regex,
    prompt: Prompt,
    prompt_len: usize,
    tag: OutcomeTag,
}

/// A compiled [`Expect`], evaluated against the accumulated receive buffer
#[derive(Debug, Clone)]
pub struct Matcher {
    patterns: Vec<CompiledEntry>,
}

impl Matcher {
    /// First entry (in declaration order) matching `buffer`, if any.
    ///
    /// `buffer` starts with the echoed command line; nothing matches until
    /// that line is complete.
    pub fn find(&self, buffer: &str) -> Option<Match> {
        let start = buffer.find('\n')? + 1;
        let reply = &buffer[start..];

        self.patterns
            .iter()
            .enumerate()
            .find_map(|(index, entry)| {
                let caps = entry.regex.captures(reply)?;
                let whole = caps.get(0)?;
                let captured = match caps.get(1) {
                    Some(group) => group.as_str().to_string(),
                    None => {
                        let text = whole.as_str();
                        text[..text.len().saturating_sub(entry.prompt_len)].to_string()
                    }
                };
                let end = start + whole.end();

                Some(Match {
                    index,
                    tag: entry.tag,
                    prompt: entry.prompt,
                    captured,
                    transcript: buffer[..end].to_string(),
                    end,
                })
            })
    }
}

/// A reply matched by one [`Expect`] entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Position of the matching entry in the expect list
    pub index: usize,
    pub tag: OutcomeTag,
    /// Prompt that terminated the reply
    pub prompt: Prompt,
    /// First capture group, or the reply text before the prompt
    pub captured: String,
    /// Everything received up to and including the prompt, echo included
    pub transcript: String,
    pub(crate) end: usize,
}

impl Match {
    /// Captured text with runs of whitespace collapsed to single spaces
    pub fn message(&self) -> String {
        squash(&self.captured)
    }

    /// Byte offset in the receive buffer just past the prompt
    pub fn end(&self) -> usize {
        self.end
    }
}

/// Collapse whitespace runs (including line breaks) into single spaces
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
