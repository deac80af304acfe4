//! Executor that records runs in the log instead of running code.
//!
//! Used by the standalone node until a sandboxed runtime is plugged in.

use crate::domain::entities::ExecutionEnvironment;
use crate::domain::errors::ExecutionError;
use crate::ports::outbound::FunctionExecutor;
use async_trait::async_trait;
use shared_types::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct LoggingExecutor {
    runs: AtomicU64,
}

impl LoggingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FunctionExecutor for LoggingExecutor {
    async fn execute(
        &self,
        env: &ExecutionEnvironment,
        command: &Command,
    ) -> Result<(), ExecutionError> {
        if env.function.code.trim().is_empty() {
            return Err(ExecutionError::InvalidCode(format!(
                "function {} has no code",
                env.function.function_name
            )));
        }

        self.runs.fetch_add(1, Ordering::Relaxed);
        info!(
            base = %env.base_name,
            function = %env.function.function_name,
            channel = %command.channel,
            msg_type = %command.msg_type,
            user_id = %env.auth.user_id,
            "Function executed"
        );
        Ok(())
    }
}
