//! Bootstrap state machine

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ErrorKind;

/// Stage of the bootstrap sequence. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum BootState {
    Init,
    EnvironmentReady,
    Activated,
    DependenciesInstalled,
    ConfigValidated,
    Running,
    Failed(ErrorKind),
}

impl BootState {
    fn rank(&self) -> Option<u8> {
        match self {
            BootState::Init => Some(0),
            BootState::EnvironmentReady => Some(1),
            BootState::Activated => Some(2),
            BootState::DependenciesInstalled => Some(3),
            BootState::ConfigValidated => Some(4),
            BootState::Running => Some(5),
            BootState::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BootState::Running | BootState::Failed(_))
    }

    /// Whether moving from `self` to `next` is legal: one step forward, or into `Failed`
    pub fn can_advance_to(&self, next: &BootState) -> bool {
        match (self.rank(), next.rank()) {
            (Some(_), None) => true,
            (Some(from), Some(to)) => to == from + 1,
            (None, _) => false,
        }
    }
}

impl std::fmt::Display for BootState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootState::Init => write!(f, "init"),
            BootState::EnvironmentReady => write!(f, "environment ready"),
            BootState::Activated => write!(f, "activated"),
            BootState::DependenciesInstalled => write!(f, "dependencies installed"),
            BootState::ConfigValidated => write!(f, "config validated"),
            BootState::Running => write!(f, "running"),
            BootState::Failed(kind) => write!(f, "failed ({})", kind),
        }
    }
}

/// A recorded state change
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub from: BootState,
    pub to: BootState,
    pub at: DateTime<Utc>,
}

/// History of one bootstrap run
#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    pub started_at: DateTime<Utc>,
    pub state: BootState,
    pub environment_created: bool,
    /// Set when the installer failed and the policy let the run continue
    pub install_warning: Option<String>,
    pub transitions: Vec<Transition>,
}

impl Default for BootReport {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            state: BootState::Init,
            environment_created: false,
            install_warning: None,
            transitions: Vec::new(),
        }
    }
}

impl BootReport {
    /// Move to `next`, recording the transition. Illegal moves are ignored
    /// and reported as `false`.
    pub fn advance(&mut self, next: BootState) -> bool {
        if !self.state.can_advance_to(&next) {
            tracing::error!(from = %self.state, to = %next, "illegal state transition");
            return false;
        }
        tracing::debug!(from = %self.state, to = %next, "state transition");
        self.transitions.push(Transition {
            from: self.state,
            to: next,
            at: Utc::now(),
        });
        self.state = next;
        true
    }

    pub fn fail(&mut self, kind: ErrorKind) {
        self.advance(BootState::Failed(kind));
    }
}
