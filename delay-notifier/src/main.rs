use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use delay_notifier::config::Args;
use delay_notifier::domain::ProviderKind;
use delay_notifier::feed::{CachedScheduleSource, ScheduleClient};
use delay_notifier::handler::{HandlerRegistry, TransitDelayHandler};
use delay_notifier::poller::Poller;
use delay_notifier::reconcile::Reconciler;
use delay_notifier::stations::StationDirectory;
use delay_notifier::store::{
    ApiClient, HttpNotificationStore, HttpProviderSource, InMemoryNotificationStore,
    NotificationStore,
};
use delay_notifier::tracker::ProviderTracker;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if args.njt_username.is_empty() || args.njt_password.is_empty() {
        warn!("NJT_USERNAME or NJT_PASSWORD not set; feed calls will fail");
    }

    let stations = match StationDirectory::load(&args.stations) {
        Ok(stations) => stations,
        Err(e) => {
            error!(path = %args.stations.display(), error = %e, "failed to load station table");
            return ExitCode::FAILURE;
        }
    };
    info!(stations = stations.len(), "loaded station table");

    let api = match ApiClient::new(args.store_config()) {
        Ok(api) => api,
        Err(e) => {
            error!(error = %e, "failed to create API client");
            return ExitCode::FAILURE;
        }
    };
    let feed = match ScheduleClient::new(args.feed_config()) {
        Ok(feed) => feed,
        Err(e) => {
            error!(error = %e, "failed to create feed client");
            return ExitCode::FAILURE;
        }
    };

    let schedules = CachedScheduleSource::new(feed, &args.feed_cache_config());
    let handler = TransitDelayHandler::new(Arc::new(schedules), Arc::new(stations))
        .with_threshold_secs(args.delay_threshold_secs);
    let registry = HandlerRegistry::new().with(ProviderKind::TransitDelay, Arc::new(handler));

    let store: Arc<dyn NotificationStore> = if args.dry_run {
        info!("dry run: notifications are kept in memory");
        Arc::new(InMemoryNotificationStore::new())
    } else {
        Arc::new(HttpNotificationStore::new(api.clone()))
    };

    let tracker = ProviderTracker::new(
        Arc::new(HttpProviderSource::new(api)),
        registry,
        Reconciler::new(store),
    );
    let poller = Poller::new(tracker, args.poller_config());

    info!(
        api = %args.api_base_url,
        interval_secs = args.poll_interval_secs,
        "delay notifier started"
    );

    tokio::select! {
        _ = poller.run_forever() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "failed to listen for shutdown signal");
                return ExitCode::FAILURE;
            }
            info!("shutting down");
        }
    }

    ExitCode::SUCCESS
}
