//! Live editing session
//!
//! A [`LiveSession`] owns the configuration and the snapshot: the normalized tree of the most
//! recent successful extraction. Every edit is compared against the snapshot, and the outcome
//! decides what the host does with the running program:
//!
//!     first edit, or structural change   -> Reload: render and restart, snapshot moves forward
//!     literal-only change                -> Patch: push the new values, snapshot stays put
//!     edit does not parse                -> Keep: the last good program keeps running
//!
//! Literal-only edits never move the snapshot, so a long run of value tweaks is always compared
//! against the tree that was last rendered, and every patch is keyed for that tree.
//!
//! State-changing operations take `&mut self`. Sharing a session between threads requires
//! wrapping it in a mutex.

use serde::{Deserialize, Serialize};

use crate::live::ast::Program;
use crate::live::config::LiveConfig;
use crate::live::diffing;
use crate::live::error::{LiveError, ParseError, Result};
use crate::live::extraction::{self, Extraction, LiteralTable};
use crate::live::parsing;

/// Result of [`LiveSession::extract`]
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    /// The source parsed; the extraction is of the source itself
    Fresh(Extraction),
    /// The source did not parse; the extraction is of the last good snapshot
    Recovered {
        extraction: Extraction,
        error: ParseError,
    },
}

impl ExtractOutcome {
    pub fn extraction(&self) -> &Extraction {
        match self {
            ExtractOutcome::Fresh(extraction) => extraction,
            ExtractOutcome::Recovered { extraction, .. } => extraction,
        }
    }

    pub fn into_extraction(self) -> Extraction {
        match self {
            ExtractOutcome::Fresh(extraction) => extraction,
            ExtractOutcome::Recovered { extraction, .. } => extraction,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, ExtractOutcome::Recovered { .. })
    }
}

/// What the host should do after an edit
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Structure changed (or there was nothing running yet): render and reload
    Reload(Extraction),
    /// Only literal values changed: push these values into the running program. Keys are the
    /// ones the running program reads.
    Patch(LiteralTable),
    /// The edit does not parse: keep the current program running
    Keep(ParseError),
}

/// Message a host posts to a running program to hot-patch its literals
///
/// `vars` holds the table as a JSON string, which the receiving side parses and copies into
/// its own table key by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMessage {
    pub vars: String,
}

impl PatchMessage {
    pub fn new(vars: &LiteralTable) -> Self {
        Self {
            vars: vars.to_string(),
        }
    }

    /// Decode the table carried by this message
    pub fn decode(&self) -> serde_json::Result<LiteralTable> {
        serde_json::from_str(&self.vars)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LiveSession {
    config: LiveConfig,
    snapshot: Option<Program>,
}

impl LiveSession {
    pub fn new(config: LiveConfig) -> Self {
        Self {
            config,
            snapshot: None,
        }
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    /// Normalized tree of the last successful extraction, if any
    pub fn snapshot(&self) -> Option<&Program> {
        self.snapshot.as_ref()
    }

    fn normalize(&self, source: &str) -> std::result::Result<Program, ParseError> {
        parsing::normalize(source, &self.config.printer.print_options())
    }

    /// Extract and rewrite `source`, recording it as the new snapshot
    ///
    /// If `source` does not parse and a snapshot exists, the snapshot is extracted instead and
    /// returned as [`ExtractOutcome::Recovered`]. Without a snapshot the parse error is returned.
    pub fn extract(&mut self, source: &str) -> Result<ExtractOutcome> {
        match self.normalize(source) {
            Ok(program) => {
                let extraction = extraction::extract(&program, &self.config.rewrite);
                self.snapshot = Some(program);
                Ok(ExtractOutcome::Fresh(extraction))
            }
            Err(error) => {
                let Some(snapshot) = &self.snapshot else {
                    tracing::debug!(
                        component = module_path!(),
                        op = "extract",
                        event = "parse_failed",
                        error = %error,
                    );
                    return Err(error.into());
                };
                tracing::warn!(
                    component = module_path!(),
                    op = "extract",
                    event = "recovered",
                    error = %error,
                    "source does not parse, re-extracting the last good program"
                );
                let extraction = extraction::extract(snapshot, &self.config.rewrite);
                Ok(ExtractOutcome::Recovered { extraction, error })
            }
        }
    }

    /// Literal table of `source` without rewriting it or touching the snapshot
    pub fn vars(&self, source: &str) -> Result<LiteralTable> {
        let program = self.normalize(source)?;
        Ok(extraction::collect_vars(&program, &self.config.rewrite))
    }

    /// Whether `source` differs structurally from the snapshot
    pub fn has_structural_change(&self, source: &str) -> Result<bool> {
        let snapshot = self.snapshot.as_ref().ok_or(LiveError::NoSnapshot)?;
        let current = self.normalize(source)?;
        Ok(diffing::has_structural_change(&current, snapshot))
    }

    /// Handle one edit: decide between reloading, patching and keeping the running program
    pub fn update(&mut self, source: &str) -> Result<Update> {
        let current = match self.normalize(source) {
            Ok(program) => program,
            Err(error) if self.snapshot.is_some() => {
                tracing::warn!(
                    component = module_path!(),
                    op = "update",
                    event = "keep",
                    error = %error,
                    "source does not parse, keeping the running program"
                );
                return Ok(Update::Keep(error));
            }
            Err(error) => return Err(error.into()),
        };

        if let Some(snapshot) = &self.snapshot {
            if !diffing::has_structural_change(&current, snapshot) {
                match extraction::patch_vars(&current, snapshot, &self.config.rewrite) {
                    Some(vars) => {
                        tracing::debug!(
                            component = module_path!(),
                            op = "update",
                            event = "patch",
                            literals = vars.len(),
                        );
                        return Ok(Update::Patch(vars));
                    }
                    None => tracing::debug!(
                        component = module_path!(),
                        op = "update",
                        event = "sites_mismatch",
                        "literal sites no longer line up with the running program"
                    ),
                }
            }
        }

        let extraction = extraction::extract(&current, &self.config.rewrite);
        tracing::debug!(
            component = module_path!(),
            op = "update",
            event = "reload",
            literals = extraction.vars.len(),
        );
        self.snapshot = Some(current);
        Ok(Update::Reload(extraction))
    }

    /// Program text for `extraction`, with the table bound per the configuration
    pub fn render(&self, extraction: &Extraction) -> String {
        extraction.render(
            &self.config.rewrite,
            &self.config.printer.print_options(),
        )
    }

    pub fn patch_message(vars: &LiteralTable) -> PatchMessage {
        PatchMessage::new(vars)
    }
}
