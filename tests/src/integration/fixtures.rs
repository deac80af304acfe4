//! Shared wiring for integration scenarios.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{InMemoryCache, InMemoryEventBus, SYSTEM_TOPIC};
use shared_types::{Auth, Command, MsgType};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use trigger_dispatch::{
    DispatchConfig, DispatcherPorts, ExecutionEnvironment, ExecutionError, FunctionExecutor,
    InMemoryFunctionStore, PrimaryFlag, StaticContextResolver, TriggerDispatcher,
};

/// One function run as seen by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub base_name: String,
    pub function_name: String,
    pub channel: String,
    pub user_id: String,
    pub data: serde_json::Value,
}

/// Executor recording every run, failing for selected function names.
#[derive(Default)]
pub struct RecordingExecutor {
    failing: HashSet<String>,
    runs: Mutex<Vec<Run>>,
}

impl RecordingExecutor {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| (*n).to_owned()).collect(),
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn runs(&self) -> Vec<Run> {
        self.runs.lock().clone()
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().len()
    }
}

#[async_trait]
impl FunctionExecutor for RecordingExecutor {
    async fn execute(
        &self,
        env: &ExecutionEnvironment,
        command: &Command,
    ) -> Result<(), ExecutionError> {
        self.runs.lock().push(Run {
            base_name: env.base_name.clone(),
            function_name: env.function.function_name.clone(),
            channel: command.channel.clone(),
            user_id: env.auth.user_id.clone(),
            data: command.data.clone(),
        });
        if self.failing.contains(&env.function.function_name) {
            return Err(ExecutionError::Runtime(format!(
                "{} threw",
                env.function.function_name
            )));
        }
        Ok(())
    }
}

/// Infrastructure shared by every replica: one bus, one cache, one store.
pub struct Shared {
    pub bus: Arc<InMemoryEventBus>,
    pub cache: Arc<InMemoryCache>,
    pub store: Arc<InMemoryFunctionStore>,
    pub resolver: Arc<StaticContextResolver>,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            bus: Arc::new(InMemoryEventBus::new()),
            cache: Arc::new(InMemoryCache::new()),
            store: Arc::new(InMemoryFunctionStore::new()),
            resolver: Arc::new(StaticContextResolver::new()),
        }
    }

    /// Accept `token` for tenant `base_name`.
    pub fn with_tenant(self, token: &str, base_name: &str) -> Self {
        self.resolver.add_account(base_name, base_name);
        self.resolver.add_token(token, base_name);
        self.store.create_base(base_name);
        self
    }

    /// Build one dispatcher instance over the shared infrastructure.
    pub fn replica(&self, primary: bool, failing: &[&str]) -> Replica {
        let executor = Arc::new(RecordingExecutor::failing(failing));
        let role = PrimaryFlag::new(primary);
        let dispatcher = Arc::new(TriggerDispatcher::new(
            DispatchConfig::default(),
            DispatcherPorts {
                bus: self.bus.clone(),
                cache: self.cache.clone(),
                store: self.store.clone(),
                resolver: self.resolver.clone(),
                executor: executor.clone(),
                role: Arc::new(role.clone()),
            },
        ));
        Replica {
            dispatcher,
            executor,
            role,
        }
    }

    /// Wait until `count` subscriptions listen on the system topic.
    pub async fn subscribed(&self, count: usize) -> bool {
        let bus = self.bus.clone();
        eventually(move || bus.topic_subscriber_count(SYSTEM_TOPIC) == count).await
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}

/// A dispatcher with its own runtime and role.
pub struct Replica {
    pub dispatcher: Arc<TriggerDispatcher>,
    pub executor: Arc<RecordingExecutor>,
    pub role: PrimaryFlag,
}

impl Replica {
    /// Spawn the receive loop.
    pub fn start(&self) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(&self.dispatcher).start())
    }
}

/// Poll `condition` every few milliseconds for up to five seconds.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}

pub fn auth(user_id: &str) -> Auth {
    Auth {
        user_id: user_id.to_owned(),
        ..Auth::default()
    }
}

/// A database change on `channel`.
pub fn db_event(token: &str, channel: &str) -> Command {
    Command::new(MsgType::DbCreated, channel, token, auth("system"))
}

/// A message published into `channel` by `user_id`.
pub fn user_event(token: &str, channel: &str, user_id: &str) -> Command {
    Command::new(MsgType::ChanIn, channel, token, auth(user_id))
}
