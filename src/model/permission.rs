//! Permission kinds and their evaluation predicates.
//!
//! A permission grants an action level at one of three scopes: a single
//! project, the repository, or globally (repository plus every project).
//! Levels are ordered — holding `Admin` implies `Read` — so evaluation is a
//! comparison, not a set lookup. The user store and permission *checking*
//! machinery live outside this crate; only the sealed kind hierarchy is here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RepoError;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// An action level, ordered from least to most privileged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Read artifacts and history.
    Read,
    /// Create and modify artifacts.
    Write,
    /// Delete artifacts.
    Delete,
    /// Administer the scope.
    Admin,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "Read"),
            Self::Write => write!(f, "Write"),
            Self::Delete => write!(f, "Delete"),
            Self::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for Action {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Read" => Ok(Self::Read),
            "Write" => Ok(Self::Write),
            "Delete" => Ok(Self::Delete),
            "Admin" => Ok(Self::Admin),
            other => Err(RepoError::invalid_parameter(format!(
                "invalid action '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// A granted permission at one scope.
///
/// External syntax: `global(ACTION)`, `repos(ACTION)`, `project(ACTION:NAME)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Permission {
    /// Grants `level` on one named project only.
    Project {
        /// The project the grant covers.
        project: String,
        /// Maximum permitted action.
        level: Action,
    },
    /// Grants `level` on repository-wide operations only.
    Repository {
        /// Maximum permitted action.
        level: Action,
    },
    /// Grants `level` everywhere: the repository and every project.
    Global {
        /// Maximum permitted action.
        level: Action,
    },
}

impl Permission {
    /// Does this permission allow `action` against the repository itself?
    #[must_use]
    pub fn permits_repository_action(&self, action: Action) -> bool {
        match self {
            Self::Project { .. } => false,
            Self::Repository { level } | Self::Global { level } => action <= *level,
        }
    }

    /// Does this permission allow `action` against `on_project`?
    #[must_use]
    pub fn permits_project_action(&self, action: Action, on_project: &str) -> bool {
        match self {
            Self::Project { project, level } => project == on_project && action <= *level,
            Self::Repository { .. } => false,
            Self::Global { level } => action <= *level,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project { project, level } => write!(f, "project({level}:{project})"),
            Self::Repository { level } => write!(f, "repos({level})"),
            Self::Global { level } => write!(f, "global({level})"),
        }
    }
}

impl FromStr for Permission {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RepoError::invalid_parameter(format!("invalid permission string '{s}'"));

        let (kind, rest) = s.split_once('(').ok_or_else(bad)?;
        let body = rest.strip_suffix(')').ok_or_else(bad)?;

        match kind {
            "global" => Ok(Self::Global {
                level: body.parse()?,
            }),
            "repos" => Ok(Self::Repository {
                level: body.parse()?,
            }),
            "project" => {
                let (level, project) = body.split_once(':').ok_or_else(bad)?;
                if project.is_empty() {
                    return Err(bad());
                }
                Ok(Self::Project {
                    project: project.to_owned(),
                    level: level.parse()?,
                })
            }
            _ => Err(bad()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
