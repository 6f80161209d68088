//! Station directory: station code → canonical name lookup.
//!
//! Loaded once at startup from a bundled `name,code` table and shared
//! read-only by everything that renders or compares station names.

mod directory;
mod error;

pub use directory::StationDirectory;
pub use error::StationError;
