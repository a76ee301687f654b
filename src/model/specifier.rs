//! Project version specifiers.
//!
//! A specifier names a point in a project's version space from the outside:
//! a history (optionally pinned to a numbered version), a change by name or
//! id, or a single change step. External syntax is `kind(project@…)`;
//! parsing failures are `InvalidParameter`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RepoError;
use crate::model::ids::{ChangeId, ChangeStepId};

// ---------------------------------------------------------------------------
// ProjectVersionSpecifier
// ---------------------------------------------------------------------------

/// A reference to a point in a project's version space.
///
/// External syntax:
/// - `history(project@history)` or `history(project@history@version)`
/// - `changeName(project@name)`
/// - `changeId(project@id)`
/// - `changeStepId(project@id)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectVersionSpecifier {
    /// A history, optionally pinned to a numbered version within it.
    History {
        /// The owning project.
        project: String,
        /// The history name.
        history: String,
        /// A specific version number, or the latest when absent.
        version: Option<u64>,
    },
    /// A change, referenced by its user-visible name.
    ChangeName {
        /// The owning project.
        project: String,
        /// The change name.
        name: String,
    },
    /// A change, referenced by id.
    ChangeId {
        /// The owning project.
        project: String,
        /// The change id.
        id: ChangeId,
    },
    /// A single step within a change.
    ChangeStep {
        /// The owning project.
        project: String,
        /// The change step id.
        id: ChangeStepId,
    },
}

impl ProjectVersionSpecifier {
    /// The project every specifier variant names.
    #[must_use]
    pub fn project(&self) -> &str {
        match self {
            Self::History { project, .. }
            | Self::ChangeName { project, .. }
            | Self::ChangeId { project, .. }
            | Self::ChangeStep { project, .. } => project,
        }
    }
}

impl fmt::Display for ProjectVersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::History {
                project,
                history,
                version: None,
            } => write!(f, "history({project}@{history})"),
            Self::History {
                project,
                history,
                version: Some(v),
            } => write!(f, "history({project}@{history}@{v})"),
            Self::ChangeName { project, name } => write!(f, "changeName({project}@{name})"),
            Self::ChangeId { project, id } => write!(f, "changeId({project}@{id})"),
            Self::ChangeStep { project, id } => write!(f, "changeStepId({project}@{id})"),
        }
    }
}

impl FromStr for ProjectVersionSpecifier {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RepoError::invalid_parameter(format!("invalid project version specifier '{s}'"));

        let (kind, rest) = s.split_once('(').ok_or_else(bad)?;
        let body = rest.strip_suffix(')').ok_or_else(bad)?;
        let parts: Vec<&str> = body.split('@').collect();

        match kind {
            "history" => match parts.as_slice() {
                [project, history] => Ok(Self::History {
                    project: (*project).to_owned(),
                    history: (*history).to_owned(),
                    version: None,
                }),
                [project, history, version] => {
                    let version = version.parse::<u64>().map_err(|_| bad())?;
                    Ok(Self::History {
                        project: (*project).to_owned(),
                        history: (*history).to_owned(),
                        version: Some(version),
                    })
                }
                _ => Err(bad()),
            },
            "changeName" => match parts.as_slice() {
                [project, name] => Ok(Self::ChangeName {
                    project: (*project).to_owned(),
                    name: (*name).to_owned(),
                }),
                _ => Err(bad()),
            },
            "changeId" => match parts.as_slice() {
                [project, id] => Ok(Self::ChangeId {
                    project: (*project).to_owned(),
                    id: ChangeId::new(id)?,
                }),
                _ => Err(bad()),
            },
            "changeStepId" => match parts.as_slice() {
                [project, id] => Ok(Self::ChangeStep {
                    project: (*project).to_owned(),
                    id: ChangeStepId::new(id)?,
                }),
                _ => Err(bad()),
            },
            _ => Err(RepoError::invalid_parameter(format!(
                "invalid project version specifier kind in '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
