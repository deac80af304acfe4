//! Core entities for Trigger Dispatch
//!
//! The per-event working set handed to the execution runtime, and the
//! values the dispatcher returns to direct callers.

use crate::domain::errors::ExecutionError;
use shared_types::{Auth, ExecData, FunctionId};
use tokio::task::JoinHandle;
use tracing::error;

/// Tenant context derived from a command's token.
///
/// Resolved fresh for every event; never cached or shared across events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Tenant database name.
    pub base_name: String,
    /// Identity of the user behind the event.
    pub auth: Auth,
}

impl TenantContext {
    pub fn new(base_name: impl Into<String>, auth: Auth) -> Self {
        Self {
            base_name: base_name.into(),
            auth,
        }
    }

    /// Bind this context to one function, producing its own environment.
    pub fn bind(&self, function: ExecData) -> ExecutionEnvironment {
        ExecutionEnvironment {
            base_name: self.base_name.clone(),
            auth: self.auth.clone(),
            function,
        }
    }
}

/// Everything the runtime needs to run one function for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    /// Tenant database name.
    pub base_name: String,
    /// Identity of the user behind the event.
    pub auth: Auth,
    /// The function to run.
    pub function: ExecData,
}

/// Result of running one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub function_id: FunctionId,
    pub function_name: String,
    pub outcome: Result<(), ExecutionError>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A function execution that has been spawned.
pub struct ScheduledExecution {
    pub function_id: FunctionId,
    pub function_name: String,
    pub handle: JoinHandle<ExecutionReport>,
}

impl ScheduledExecution {
    /// Wait for the execution to finish.
    ///
    /// A panicking or cancelled task is reported as `ExecutionError::Aborted`.
    pub async fn join(self) -> ExecutionReport {
        match self.handle.await {
            Ok(report) => report,
            Err(e) => {
                error!(
                    function = %self.function_name,
                    error = %e,
                    "Execution task did not complete"
                );
                ExecutionReport {
                    function_id: self.function_id,
                    function_name: self.function_name,
                    outcome: Err(ExecutionError::Aborted(e.to_string())),
                }
            }
        }
    }
}

/// What happened to one event handed to the dispatcher.
pub enum DispatchOutcome {
    /// One execution per matched function was spawned.
    Scheduled(Vec<ScheduledExecution>),
    /// The user exceeded the rate limit; the event was dropped.
    RateLimited,
    /// This instance is not primary; the event was ignored.
    NotPrimary,
}

impl DispatchOutcome {
    /// Number of executions spawned.
    pub fn scheduled_count(&self) -> usize {
        match self {
            Self::Scheduled(executions) => executions.len(),
            Self::RateLimited | Self::NotPrimary => 0,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Wait for every spawned execution and collect the reports.
    pub async fn join_all(self) -> Vec<ExecutionReport> {
        let Self::Scheduled(executions) = self else {
            return Vec::new();
        };
        let mut reports = Vec::with_capacity(executions.len());
        for execution in executions {
            reports.push(execution.join().await);
        }
        reports
    }
}

impl std::fmt::Debug for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled(executions) => f
                .debug_tuple("Scheduled")
                .field(
                    &executions
                        .iter()
                        .map(|e| e.function_name.as_str())
                        .collect::<Vec<_>>(),
                )
                .finish(),
            Self::RateLimited => f.write_str("RateLimited"),
            Self::NotPrimary => f.write_str("NotPrimary"),
        }
    }
}
