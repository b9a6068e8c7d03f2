#![doc(test(attr(deny(warnings))))]

//! Budget Forecast turns a household ledger into next-period spend forecasts
//! and keeps recurring transactions materialized on schedule.
//!
//! The engine works over caller-supplied snapshots: the [`forecast`] pipeline
//! is pure, the [`ledger`] scheduler returns advanced templates instead of
//! mutating in place, and [`core::RecomputePass`] sequences both against a
//! [`core::RecordStore`].

pub mod config;
pub mod core;
pub mod errors;
pub mod forecast;
pub mod ledger;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget forecast tracing initialized.");
    });
}
