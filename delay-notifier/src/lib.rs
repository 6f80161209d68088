//! Transit delay notifier.
//!
//! Polls a provider registry, checks each commute route against the live
//! departure board, and keeps one notification per delayed or canceled
//! train in the notification store.

pub mod anomaly;
pub mod config;
pub mod domain;
pub mod feed;
pub mod handler;
pub mod poller;
pub mod reconcile;
pub mod stations;
pub mod store;
pub mod synth;
pub mod tracker;
