//! Token to tenant resolution from a static table.

use crate::domain::entities::TenantContext;
use crate::domain::errors::ContextError;
use crate::ports::outbound::ContextResolver;
use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::Command;

/// Resolves tokens through two tables: token to account, account to base.
///
/// Tokens are checked first, so a revoked token fails with
/// `InvalidToken` even when its account still has a database.
#[derive(Debug, Default)]
pub struct StaticContextResolver {
    tokens: DashMap<String, String>,
    bases: DashMap<String, String>,
}

impl StaticContextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `account_id` to its tenant database.
    pub fn add_account(&self, account_id: impl Into<String>, base_name: impl Into<String>) {
        self.bases.insert(account_id.into(), base_name.into());
    }

    /// Accept `token` on behalf of `account_id`.
    pub fn add_token(&self, token: impl Into<String>, account_id: impl Into<String>) {
        self.tokens.insert(token.into(), account_id.into());
    }

    pub fn revoke_token(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    pub fn account_count(&self) -> usize {
        self.bases.len()
    }
}

#[async_trait]
impl ContextResolver for StaticContextResolver {
    async fn resolve(&self, command: &Command) -> Result<TenantContext, ContextError> {
        let account_id = self
            .tokens
            .get(&command.token)
            .map(|entry| entry.value().clone())
            .ok_or(ContextError::InvalidToken)?;

        let base_name = self
            .bases
            .get(&account_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ContextError::UnknownAccount(account_id.clone()))?;

        let mut auth = command.auth.clone();
        if auth.account_id.is_empty() {
            auth.account_id = account_id;
        }
        Ok(TenantContext::new(base_name, auth))
    }
}
