//! Credential resolution and multi-source disambiguation.
//!
//! The same login name legitimately exists in multiple identity systems at
//! once: a local fallback account plus accounts in one or more directory
//! domains. The resolver must never silently guess when true ambiguity
//! exists, but must not force a choice when inactive domains make the
//! ambiguity moot.

use std::collections::BTreeSet;
use std::sync::Arc;

use medibay_core::ServiceError;

use crate::AuthResult;
use crate::storage::{AccountStore, DomainStore};
use crate::types::{Account, ResolutionResult};

/// Resolves a typed user id to exactly one account, or to a typed
/// non-success result.
pub struct CredentialResolver {
    accounts: Arc<dyn AccountStore>,
    domains: Arc<dyn DomainStore>,
}

impl CredentialResolver {
    /// Creates a resolver over the given stores.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountStore>, domains: Arc<dyn DomainStore>) -> Self {
        Self { accounts, domains }
    }

    /// Resolves a typed user id.
    ///
    /// A user id that already carries a domain delimiter (`\` or `@`) is
    /// delegated to a domain-qualified lookup: exactly that one match or
    /// not-found, no disambiguation.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentInvalid` for a blank user id, or a storage error.
    /// All resolution outcomes, including not-found and ambiguity, are
    /// values of [`ResolutionResult`], never errors.
    pub async fn resolve(&self, typed_user_id: &str) -> AuthResult<ResolutionResult> {
        let trimmed = typed_user_id.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::argument_invalid("user id must not be empty"));
        }
        let normalized = trimmed.to_lowercase();

        if let Some((domain, user_id)) = split_qualified(&normalized) {
            tracing::debug!(domain, user_id, "domain-qualified resolution");
            return Ok(match self.accounts.find_domain_by_user_id(domain, user_id).await? {
                Some(account) => ResolutionResult::successful(account),
                None => ResolutionResult::not_found(),
            });
        }

        let mut matches = self.accounts.find_all_by_user_id(&normalized).await?;
        match matches.len() {
            0 => Ok(ResolutionResult::not_found()),
            1 => Ok(ResolutionResult::successful(matches.remove(0))),
            _ => self.disambiguate(matches).await,
        }
    }

    /// Disambiguates two or more accounts sharing one user id.
    async fn disambiguate(&self, matches: Vec<Account>) -> AuthResult<ResolutionResult> {
        // Active domains referenced by the matches. Inactive domains are
        // filtered out here and never participate in disambiguation.
        let mut active_domains: BTreeSet<String> = BTreeSet::new();
        for account in &matches {
            if let Some(domain_name) = &account.domain {
                if let Some(domain) = self.domains.find_by_name(domain_name).await? {
                    if domain.active {
                        active_domains.insert(domain.name);
                    }
                }
            }
        }

        let has_local = matches.iter().any(Account::is_local);
        let has_active_local = matches.iter().any(|a| a.is_local() && a.active);

        // The user's only affiliations are domains currently disabled.
        if active_domains.is_empty() && !has_local {
            let first = matches
                .into_iter()
                .next()
                .ok_or_else(|| ServiceError::unhandled("disambiguation over an empty match set"))?;
            return Ok(ResolutionResult::inactive_domain(first));
        }

        // True ambiguity: several active domains, or one active domain
        // competing with an active local account. Inactive local
        // duplicates are silently dropped from the choice list.
        if active_domains.len() > 1 || (active_domains.len() == 1 && has_active_local) {
            let candidates: Vec<Account> = matches
                .into_iter()
                .filter(|a| !(a.is_local() && !a.active))
                .collect();
            tracing::debug!(candidates = candidates.len(), "ambiguous user id");
            return Ok(ResolutionResult::multiple(candidates));
        }

        // Exactly one active domain and no active local competitor.
        if let Some(active_name) = active_domains.iter().next() {
            let resolved = matches
                .into_iter()
                .find(|a| a.domain.as_deref() == Some(active_name))
                .ok_or_else(|| {
                    ServiceError::unhandled("no match in the single active domain")
                })?;
            return Ok(ResolutionResult::successful(resolved));
        }

        // No active domains; fall back to the local account.
        let local = matches
            .into_iter()
            .find(Account::is_local)
            .ok_or_else(|| ServiceError::unhandled("no local account among the matches"))?;
        Ok(ResolutionResult::successful(local))
    }
}

/// Splits a domain-qualified user id into `(domain, user_id)`.
///
/// Accepts `domain\user` and `user@domain`.
fn split_qualified(input: &str) -> Option<(&str, &str)> {
    if let Some((domain, user_id)) = input.split_once('\\') {
        return Some((domain, user_id));
    }
    if let Some((user_id, domain)) = input.split_once('@') {
        return Some((domain, user_id));
    }
    None
}
