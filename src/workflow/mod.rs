//! Workflow Graph Executor
//!
//! Threads one mutable state value through a chain of named stages:
//!
//! ```text
//! entry ──► stage ──► stage ──► ... ──► END
//! ```
//!
//! The graph is a map with a single-successor invariant, not a DAG engine:
//! a source may record several edges but only the first recorded one is
//! followed. Edges that would close a cycle along followed edges are rejected
//! when wired, so every run terminates.
//!
//! ## Ownership
//!
//! `run()` takes the state by value and lends `&mut S` to each stage in turn.
//! A stage cannot keep a handle to the state after it returns. The state comes
//! back to the caller on success, or inside [`RunFailure`] when a stage fails.
//!
//! ## Failure
//!
//! A failing stage aborts the run at once. There is no retry, rollback,
//! timeout or cancellation here; callers that need those wrap `run()`.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info_span, warn, Instrument};

/// Terminal sentinel. Connecting a stage to `END` finishes the run there.
pub const END: &str = "__end__";

/// State threaded through a workflow run.
pub trait WorkflowState: Send {
    /// Called right before the named stage runs.
    fn enter_stage(&mut self, _name: &str) {}
}

/// One named step of a workflow.
///
/// Stages are shared (`&self`) across concurrent runs; per-run data belongs
/// in the state.
#[async_trait]
pub trait Stage<S: WorkflowState>: Send + Sync {
    async fn run(&self, state: &mut S) -> anyhow::Result<()>;
}

// ============================================================================
// Errors
// ============================================================================

/// Wiring mistakes, reported when the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("stage name `{0}` is reserved for the terminal sentinel")]
    ReservedName(String),

    #[error("edges cannot leave the terminal sentinel (attempted edge to `{0}`)")]
    EdgeFromTerminal(String),

    #[error("edge `{from}` -> `{to}` would create a cycle")]
    Cycle { from: String, to: String },
}

/// A stage failed. Carries the failing stage name and the state as the
/// failing stage left it.
#[derive(Debug)]
pub struct RunFailure<S> {
    pub stage: String,
    pub state: S,
    pub error: anyhow::Error,
}

impl<S> RunFailure<S> {
    /// Partially mutated state at the point of failure.
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S> fmt::Display for RunFailure<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage `{}` failed: {:#}", self.stage, self.error)
    }
}

impl<S: fmt::Debug> std::error::Error for RunFailure<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = self.error.as_ref();
        Some(source)
    }
}

// ============================================================================
// Workflow
// ============================================================================

/// Named stages plus first-edge routing.
pub struct Workflow<S: WorkflowState> {
    stages: HashMap<String, Box<dyn Stage<S>>>,
    /// Every recorded edge per source; only `[0]` is followed.
    edges: HashMap<String, Vec<String>>,
    entry: Option<String>,
}

impl<S: WorkflowState + 'static> Default for Workflow<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WorkflowState + 'static> Workflow<S> {
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
        }
    }

    /// Associate `name` with a stage. Registering a name again replaces the
    /// previous stage.
    pub fn register_stage(
        &mut self,
        name: impl Into<String>,
        stage: impl Stage<S> + 'static,
    ) -> Result<&mut Self, WorkflowError> {
        let name = name.into();
        if name == END {
            return Err(WorkflowError::ReservedName(name));
        }
        if self.stages.insert(name.clone(), Box::new(stage)).is_some() {
            debug!(stage = %name, "Stage re-registered, previous handler replaced");
        }
        Ok(self)
    }

    /// Record a directed edge. Only the first edge recorded for a source is
    /// followed at run time; later ones are kept but ignored.
    pub fn connect(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<&mut Self, WorkflowError> {
        let from = from.into();
        let to = to.into();

        if from == END {
            return Err(WorkflowError::EdgeFromTerminal(to));
        }

        let becomes_first = !self.edges.contains_key(&from);
        if becomes_first && self.reaches(&to, &from) {
            return Err(WorkflowError::Cycle { from, to });
        }
        if !becomes_first {
            debug!(from = %from, to = %to, "Additional edge recorded but never followed");
        }

        self.edges.entry(from).or_default().push(to);
        Ok(self)
    }

    /// Designate the first stage of every run.
    pub fn set_entry(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// The edge `run()` follows out of `name`.
    pub fn next_hop(&self, name: &str) -> Option<&str> {
        self.edges
            .get(name)
            .and_then(|targets| targets.first())
            .map(String::as_str)
    }

    /// Stages a run visits, in order, assuming every stage succeeds.
    pub fn path(&self) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = self.entry.as_deref();
        while let Some(name) = current {
            if name == END || !self.is_registered(name) {
                break;
            }
            path.push(name.to_string());
            current = self.next_hop(name);
        }
        path
    }

    /// Follow first edges from `start`; true if `target` is hit. Terminates
    /// because followed edges are kept acyclic.
    fn reaches(&self, start: &str, target: &str) -> bool {
        let mut current = Some(start);
        while let Some(name) = current {
            if name == target {
                return true;
            }
            current = self.next_hop(name);
        }
        false
    }

    /// Execute one run from the entry stage.
    ///
    /// Stops after a stage with no outgoing edge, on reaching [`END`], or when
    /// the next hop is not registered. Returns the final state, or the failing
    /// stage with the partially mutated state.
    pub async fn run(&self, mut state: S) -> Result<S, RunFailure<S>> {
        let Some(mut current) = self.entry.clone() else {
            warn!("Workflow has no entry stage, returning state unchanged");
            return Ok(state);
        };

        loop {
            if current == END {
                break;
            }
            let Some(stage) = self.stages.get(&current) else {
                warn!(stage = %current, "Stage not registered, stopping run");
                break;
            };

            state.enter_stage(&current);
            let started = Instant::now();
            let result = stage
                .run(&mut state)
                .instrument(info_span!("stage", name = %current))
                .await;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

            if let Err(error) = result {
                warn!(stage = %current, elapsed_ms, error = %error, "Stage failed, aborting run");
                return Err(RunFailure {
                    stage: current,
                    state,
                    error,
                });
            }
            debug!(stage = %current, elapsed_ms, "Stage complete");

            match self.next_hop(&current) {
                Some(next) => current = next.to_string(),
                None => break,
            }
        }

        Ok(state)
    }
}
