//! Trigger Dispatcher
//!
//! Main service implementing `TriggerDispatchApi`.

use crate::config::DispatchConfig;
use crate::domain::entities::{
    DispatchOutcome, ExecutionReport, ScheduledExecution, TenantContext,
};
use crate::domain::errors::{DispatchError, ExecutionError};
use crate::domain::rate_limiter::UserRateLimiter;
use crate::metrics::{DispatchMetrics, DispatchMetricsSnapshot};
use crate::ports::inbound::TriggerDispatchApi;
use crate::ports::outbound::{ContextResolver, FunctionExecutor, FunctionStore, InstanceRole};
use crate::service::trigger_cache::TriggerCache;
use async_trait::async_trait;
use shared_bus::{CacheStore, EventSubscriber};
use shared_types::{Command, ExecData, FunctionId};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// External collaborators of the dispatcher.
pub struct DispatcherPorts {
    pub bus: Arc<dyn EventSubscriber>,
    pub cache: Arc<dyn CacheStore>,
    pub store: Arc<dyn FunctionStore>,
    pub resolver: Arc<dyn ContextResolver>,
    pub executor: Arc<dyn FunctionExecutor>,
    pub role: Arc<dyn InstanceRole>,
}

/// Trigger Dispatcher
///
/// Orchestrates one event:
/// 1. Primary-instance gate
/// 2. Rate limit (user events only)
/// 3. Resolve tenant context from the token
/// 4. Resolve triggered functions through the cache
/// 5. Spawn one execution per function
pub struct TriggerDispatcher {
    config: DispatchConfig,
    bus: Arc<dyn EventSubscriber>,
    resolver: Arc<dyn ContextResolver>,
    triggers: TriggerCache,
    limiter: Arc<UserRateLimiter>,
    executor: Arc<dyn FunctionExecutor>,
    role: Arc<dyn InstanceRole>,
    metrics: Arc<DispatchMetrics>,
}

impl TriggerDispatcher {
    pub fn new(config: DispatchConfig, ports: DispatcherPorts) -> Self {
        let limiter = Arc::new(UserRateLimiter::from_config(&config.rate_limit));
        let triggers =
            TriggerCache::with_prefix(ports.cache, ports.store, config.function_key_prefix.clone());

        Self {
            config,
            bus: ports.bus,
            resolver: ports.resolver,
            triggers,
            limiter,
            executor: ports.executor,
            role: ports.role,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Share a rate limiter with other dispatchers in this process.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<UserRateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &UserRateLimiter {
        &self.limiter
    }

    pub fn trigger_cache(&self) -> &TriggerCache {
        &self.triggers
    }

    pub fn metrics(&self) -> DispatchMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run the receive loop on the system topic.
    ///
    /// Returns when the bus raises its closed signal. There is no restart;
    /// the owner decides what happens next.
    pub async fn start(self: Arc<Self>) {
        let topic = self.config.system_topic.clone();
        let mut subscription = self.bus.subscribe(&topic);
        info!(topic = %topic, "Function dispatcher subscribed");

        while let Some(command) = subscription.recv().await {
            self.receive(command);
        }

        warn!(topic = %topic, "System topic subscription closed, dispatcher stopped");
    }

    /// Hand one received event to its own task.
    ///
    /// Returns `None` when this instance is not primary; the event is then
    /// dropped without touching the cache, the store or the runtime.
    pub fn receive(self: &Arc<Self>, command: Command) -> Option<JoinHandle<()>> {
        if !self.role.is_primary() {
            self.metrics.record_dropped_non_primary();
            return None;
        }

        let dispatcher = Arc::clone(self);
        Some(tokio::spawn(async move {
            // Failures are logged where they happen.
            let _ = dispatcher.process(command).await;
        }))
    }

    async fn process(&self, command: Command) -> Result<DispatchOutcome, DispatchError> {
        self.metrics.record_event_received();

        if !command.is_system_event() && !self.limiter.allow(&command.auth.user_id) {
            self.metrics.record_rate_limited();
            warn!(
                user_id = %command.auth.user_id,
                channel = %command.channel,
                msg_type = %command.msg_type,
                "user exceeded amount of allowed messages"
            );
            return Ok(DispatchOutcome::RateLimited);
        }

        let context = self.resolver.resolve(&command).await.map_err(|e| {
            self.metrics.record_context_failure();
            error!(
                channel = %command.channel,
                msg_type = %command.msg_type,
                error = %e,
                "Cannot retrieve base from token"
            );
            e
        })?;

        let functions = self
            .triggers
            .resolve(&context.base_name, &command.channel)
            .await
            .map_err(|e| {
                self.metrics.record_resolution_failure();
                error!(
                    base = %context.base_name,
                    channel = %command.channel,
                    error = %e,
                    "Error getting functions by trigger"
                );
                e
            })?;

        debug!(
            base = %context.base_name,
            channel = %command.channel,
            msg_type = %command.msg_type,
            count = functions.len(),
            "Dispatching triggered functions"
        );

        let command = Arc::new(command);
        let executions = functions
            .into_iter()
            .map(|function| self.schedule(&context, function, Arc::clone(&command)))
            .collect();

        Ok(DispatchOutcome::Scheduled(executions))
    }

    /// Spawn one function run with its own environment.
    fn schedule(
        &self,
        context: &TenantContext,
        function: ExecData,
        command: Arc<Command>,
    ) -> ScheduledExecution {
        let function_id = function.id.clone();
        let function_name = function.function_name.clone();
        let env = context.bind(function);
        let executor = Arc::clone(&self.executor);
        let metrics = Arc::clone(&self.metrics);

        self.metrics.record_execution_scheduled();
        let handle = tokio::spawn(async move {
            // The run gets its own task so a panicking runtime is still
            // counted and logged here.
            let run = {
                let env = env.clone();
                let command = Arc::clone(&command);
                tokio::spawn(async move { executor.execute(&env, &command).await })
            };
            let outcome = match run.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ExecutionError::Aborted(e.to_string())),
            };
            metrics.record_execution_finished(outcome.is_ok());

            if let Err(e) = &outcome {
                error!(
                    base = %env.base_name,
                    function = %env.function.function_name,
                    channel = %command.channel,
                    error = %e,
                    "Function execution failed"
                );
            }

            ExecutionReport {
                function_id: env.function.id,
                function_name: env.function.function_name,
                outcome,
            }
        });

        ScheduledExecution {
            function_id,
            function_name,
            handle,
        }
    }
}

#[async_trait]
impl TriggerDispatchApi for TriggerDispatcher {
    async fn dispatch(&self, command: Command) -> Result<DispatchOutcome, DispatchError> {
        if !self.role.is_primary() {
            self.metrics.record_dropped_non_primary();
            return Ok(DispatchOutcome::NotPrimary);
        }
        self.process(command).await
    }

    async fn invalidate_trigger(
        &self,
        base_name: &str,
        channel: &str,
    ) -> Result<bool, DispatchError> {
        Ok(self.triggers.invalidate(base_name, channel).await?)
    }

    async fn invalidate_function(&self, function_id: &FunctionId) -> Result<bool, DispatchError> {
        Ok(self.triggers.invalidate_function(function_id).await?)
    }

    fn is_primary(&self) -> bool {
        self.role.is_primary()
    }
}
