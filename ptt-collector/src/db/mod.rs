//! Database access for the collector
//!
//! Schema creation lives in `ptt_common::db`; this module holds the queries.

pub mod prayer_times;
pub mod settings;

pub use prayer_times::{PersistenceGateway, SqlitePrayerTimeStore};
