//! Provider lifecycle tracking.
//!
//! The tracker owns one [`ProviderState`] per provider for the life of the
//! process. Each cycle it diffs the provider listing against that map,
//! retires removed providers, binds new ones to their kind's handler, and
//! then polls and reconciles every tracked provider.
//!
//! Cycles never overlap, so the map is a plain `HashMap` mutated only from
//! [`ProviderTracker::run_cycle`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::domain::{Notification, Provider, ProviderId};
use crate::handler::{HandlerRegistry, ProviderHandler};
use crate::reconcile::Reconciler;
use crate::store::{ProviderSource, StoreError};

/// Per-provider state carried across cycles.
pub struct ProviderState {
    pub provider: Provider,
    handler: Arc<dyn ProviderHandler>,
    /// Notifications applied by the last successful reconciliation.
    pub applied: Vec<Notification>,
}

impl ProviderState {
    fn new(provider: Provider, handler: Arc<dyn ProviderHandler>) -> Self {
        Self {
            provider,
            handler,
            applied: Vec::new(),
        }
    }
}

/// Counts from one cycle, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The provider listing failed and nothing else ran.
    pub listing_failed: bool,
    pub added: usize,
    pub removed: usize,
    /// Providers whose kind has no registered handler.
    pub unsupported: usize,
    pub reconciled: usize,
    pub poll_failures: usize,
    pub apply_failures: usize,
    /// Deletes that failed and won't be retried.
    pub orphaned: usize,
}

/// Result of the startup purge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub matched: usize,
    pub deleted: usize,
}

/// Owns provider state and drives reconciliation cycles.
pub struct ProviderTracker {
    source: Arc<dyn ProviderSource>,
    registry: HandlerRegistry,
    reconciler: Reconciler,
    states: HashMap<ProviderId, ProviderState>,
}

impl ProviderTracker {
    pub fn new(
        source: Arc<dyn ProviderSource>,
        registry: HandlerRegistry,
        reconciler: Reconciler,
    ) -> Self {
        Self {
            source,
            registry,
            reconciler,
            states: HashMap::new(),
        }
    }

    /// Number of tracked providers.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State of a tracked provider.
    pub fn state(&self, id: &ProviderId) -> Option<&ProviderState> {
        self.states.get(id)
    }

    /// Delete every stored notification carrying one of our source tags.
    ///
    /// The tracker keeps nothing across restarts, so whatever an earlier
    /// process left behind is unreachable and must go before the first
    /// cycle. Failures are logged; the purge never aborts startup.
    #[instrument(skip(self))]
    pub async fn purge_stale(&self) -> Result<PurgeReport, StoreError> {
        let tags = self.registry.source_tags();
        let store = self.reconciler.store();

        let stale: Vec<Notification> = store
            .list(false)
            .await?
            .into_iter()
            .filter(|n| tags.iter().any(|tag| n.has_source(tag)))
            .collect();

        let results = join_all(stale.iter().map(|n| async move {
            let result = store.delete(&n.id).await;
            if let Err(e) = &result {
                warn!(id = %n.id, error = %e, "failed to purge stale notification");
            }
            result
        }))
        .await;

        let report = PurgeReport {
            matched: stale.len(),
            deleted: results.iter().filter(|r| r.is_ok()).count(),
        };
        info!(
            matched = report.matched,
            deleted = report.deleted,
            "purged stale notifications"
        );
        Ok(report)
    }

    /// Diff the tracked providers against `current`.
    ///
    /// Providers missing from `current` have their notifications retired and
    /// their state dropped. New providers are bound to their kind's handler
    /// with an empty baseline. Known providers are left as they are.
    pub async fn reconcile_provider_set(&mut self, current: Vec<Provider>) -> CycleReport {
        let mut report = CycleReport::default();
        let current_ids: HashSet<ProviderId> = current.iter().map(|p| p.id.clone()).collect();

        let removed: Vec<ProviderId> = self
            .states
            .keys()
            .filter(|id| !current_ids.contains(*id))
            .cloned()
            .collect();

        for id in removed {
            let Some(state) = self.states.remove(&id) else {
                continue;
            };
            debug!(provider = %id, notifications = state.applied.len(), "provider removed");
            let retired = self.reconciler.retire(&state.applied).await;
            report.removed += 1;
            report.orphaned += retired.orphaned.len();
        }

        for provider in current {
            if let Some(existing) = self.states.get(&provider.id) {
                if existing.provider != provider {
                    warn!(
                        provider = %provider.id,
                        "provider settings changed; keeping the settings it was added with"
                    );
                }
                continue;
            }

            let Some(handler) = self.registry.get(provider.kind) else {
                warn!(provider = %provider.id, kind = %provider.kind, "unsupported provider kind");
                report.unsupported += 1;
                continue;
            };

            info!(provider = %provider.id, route = %provider.route, "tracking new provider");
            self.states
                .insert(provider.id.clone(), ProviderState::new(provider, handler));
            report.added += 1;
        }

        report
    }

    /// Run one full cycle: list, diff, then poll and reconcile every provider.
    #[instrument(skip(self))]
    pub async fn run_cycle(&mut self) -> CycleReport {
        let providers = match self.source.list_providers().await {
            Ok(providers) => providers,
            Err(e) => {
                warn!(error = %e, "failed to list providers; skipping cycle");
                return CycleReport {
                    listing_failed: true,
                    ..Default::default()
                };
            }
        };
        debug!(count = providers.len(), "listed providers");

        let mut report = self.reconcile_provider_set(providers).await;

        for state in self.states.values_mut() {
            let id = &state.provider.id;

            let new = match state.handler.poll(&state.provider).await {
                Ok(new) => new,
                Err(e) => {
                    warn!(provider = %id, error = %e, "failed to poll provider");
                    report.poll_failures += 1;
                    continue;
                }
            };

            match self.reconciler.apply(new, &state.applied).await {
                Ok(applied) => {
                    debug!(
                        provider = %id,
                        created = applied.notifications.len(),
                        deleted = applied.deleted,
                        "reconciled notifications"
                    );
                    if !applied.orphaned.is_empty() {
                        warn!(
                            provider = %id,
                            orphaned = ?applied.orphaned,
                            "old notifications could not be removed"
                        );
                    }
                    report.orphaned += applied.orphaned.len();
                    report.reconciled += 1;
                    state.applied = applied.notifications;
                }
                Err(e) => {
                    warn!(
                        provider = %id,
                        error = %e,
                        stranded = ?e.created,
                        "failed to apply notifications; keeping previous set"
                    );
                    report.apply_failures += 1;
                }
            }
        }

        report
    }
}
