//! # Action Module
//!
//! Applies the configured side effect to every matched pair, strictly after
//! the search has finished.
//!
//! A failure on one pair (file already gone, viewer missing) is logged and
//! counted, and dispatch moves on to the next pair.

use crate::core::search::Match;
use crate::error::ActionError;
use crate::events::{null_sender, ActionEvent, Event, EventSender};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use tracing::{info, warn};

/// Viewer invoked by [`Action::View`] unless overridden
pub const DEFAULT_VIEWER: &str = "xv -nolim";

/// What to do with each matched pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    /// Remove the first file of the pair
    DeleteFirst,
    /// Remove the second file of the pair
    DeleteSecond,
    /// Open both files in an external viewer and wait for it to exit
    #[default]
    View,
    /// Leave the pair alone
    NoAction,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::DeleteFirst => write!(f, "delete_first"),
            Action::DeleteSecond => write!(f, "delete_second"),
            Action::View => write!(f, "view"),
            Action::NoAction => write!(f, "none"),
        }
    }
}

/// External viewer program plus its leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl FromStr for ViewerCommand {
    type Err = ActionError;

    /// Split on whitespace: the first word is the program
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace().map(String::from);
        let program = words.next().ok_or(ActionError::EmptyViewer)?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl Default for ViewerCommand {
    fn default() -> Self {
        Self {
            program: "xv".to_string(),
            args: vec!["-nolim".to_string()],
        }
    }
}

/// Outcome of dispatching over all matches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Pairs the action succeeded on
    pub applied: usize,
    /// Pairs the action failed on
    pub failed: usize,
    /// One message per failure
    pub errors: Vec<String>,
}

/// Applies one [`Action`] to matched pairs
#[derive(Debug, Clone, Default)]
pub struct ActionDispatcher {
    action: Action,
    viewer: ViewerCommand,
}

impl ActionDispatcher {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            viewer: ViewerCommand::default(),
        }
    }

    /// Use a different viewer for [`Action::View`]
    pub fn with_viewer(mut self, viewer: ViewerCommand) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Apply the action to a single pair
    pub fn apply(&self, pair: &Match) -> Result<(), ActionError> {
        match self.action {
            Action::DeleteFirst => remove(&pair.first),
            Action::DeleteSecond => remove(&pair.second),
            Action::View => self.view(pair),
            Action::NoAction => Ok(()),
        }
    }

    /// Apply the action to every pair in order
    pub fn dispatch(&self, matches: &[Match]) -> DispatchReport {
        self.dispatch_with_events(matches, &null_sender())
    }

    /// Apply the action to every pair in order, reporting each outcome
    pub fn dispatch_with_events(&self, matches: &[Match], events: &EventSender) -> DispatchReport {
        let mut report = DispatchReport::default();

        for pair in matches {
            match self.apply(pair) {
                Ok(()) => {
                    report.applied += 1;
                    events.send(Event::Action(ActionEvent::Applied {
                        first: pair.first.clone(),
                        second: pair.second.clone(),
                    }));
                }
                Err(e) => {
                    warn!(
                        first = %pair.first.display(),
                        second = %pair.second.display(),
                        action = %self.action,
                        error = %e,
                        "action failed"
                    );
                    report.failed += 1;
                    events.send(Event::Action(ActionEvent::Failed {
                        first: pair.first.clone(),
                        second: pair.second.clone(),
                        message: e.to_string(),
                    }));
                    report.errors.push(e.to_string());
                }
            }
        }

        report
    }

    fn view(&self, pair: &Match) -> Result<(), ActionError> {
        let status = Command::new(&self.viewer.program)
            .args(&self.viewer.args)
            .arg(&pair.first)
            .arg(&pair.second)
            .status()
            .map_err(|source| ActionError::ViewerLaunch {
                program: self.viewer.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ActionError::ViewerFailed {
                program: self.viewer.program.clone(),
                status,
            })
        }
    }
}

fn remove(path: &Path) -> Result<(), ActionError> {
    fs::remove_file(path).map_err(|source| ActionError::Remove {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "removed duplicate");
    Ok(())
}
