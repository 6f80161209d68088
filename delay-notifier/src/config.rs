//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

use crate::anomaly::DEFAULT_DELAY_THRESHOLD_SECS;
use crate::feed::{FeedCacheConfig, FeedConfig};
use crate::poller::PollerConfig;
use crate::store::StoreConfig;

/// Watch commute routes for delays and keep notifications in sync.
#[derive(Debug, Clone, Parser)]
#[command(name = "delay-notifier", version, about)]
pub struct Args {
    /// Base URL of the provider/notification API
    #[arg(short = 'u', long, env = "API_BASE_URL")]
    pub api_base_url: String,

    /// HTTP basic auth username for the API
    #[arg(short = 'a', long, env = "API_USERNAME")]
    pub username: Option<String>,

    /// HTTP basic auth password for the API
    #[arg(short = 'p', long, env = "API_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Username for the train data feed
    #[arg(long, env = "NJT_USERNAME", default_value = "")]
    pub njt_username: String,

    /// Password for the train data feed
    #[arg(long, env = "NJT_PASSWORD", default_value = "", hide_env_values = true)]
    pub njt_password: String,

    /// Override the train data feed URL
    #[arg(long, env = "NJT_BASE_URL")]
    pub njt_base_url: Option<String>,

    /// Station table (`name,code` per line)
    #[arg(long, env = "STATIONS_FILE", default_value = "data/njt_stations.csv")]
    pub stations: PathBuf,

    /// Seconds to sleep between cycles
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 300)]
    pub poll_interval_secs: u64,

    /// Lateness in seconds that counts as a delay
    #[arg(long, env = "DELAY_THRESHOLD_SECS", default_value_t = DEFAULT_DELAY_THRESHOLD_SECS)]
    pub delay_threshold_secs: i64,

    /// Seconds a station's schedule is reused across providers
    #[arg(long, env = "FEED_CACHE_SECS", default_value_t = 60)]
    pub feed_cache_secs: u64,

    /// Keep notifications in memory instead of writing them to the API
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Provider/notification API settings.
    pub fn store_config(&self) -> StoreConfig {
        let config = StoreConfig::new(&self.api_base_url);
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => config.with_basic_auth(user, pass),
            _ => config,
        }
    }

    /// Train data feed settings.
    pub fn feed_config(&self) -> FeedConfig {
        let config = FeedConfig::new(&self.njt_username, &self.njt_password);
        match &self.njt_base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    /// Schedule cache settings.
    ///
    /// The TTL is kept below the poll interval so every cycle sees a fresh
    /// board.
    pub fn feed_cache_config(&self) -> FeedCacheConfig {
        let max_secs = self.poll_interval_secs.saturating_sub(1);
        let secs = if self.feed_cache_secs > max_secs {
            warn!(
                feed_cache_secs = self.feed_cache_secs,
                poll_interval_secs = self.poll_interval_secs,
                "feed cache TTL must be shorter than the poll interval; clamping"
            );
            max_secs
        } else {
            self.feed_cache_secs
        };

        FeedCacheConfig {
            ttl: Duration::from_secs(secs),
            ..Default::default()
        }
    }

    /// Loop settings.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig::default().with_interval(Duration::from_secs(self.poll_interval_secs))
    }
}
