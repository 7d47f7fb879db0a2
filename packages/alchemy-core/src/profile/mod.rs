//! Risk profile builders.
//!
//! Both builders are pure functions: they borrow their inputs and return a new,
//! independently owned profile.

mod asset;
mod portfolio;

pub use asset::{build_asset_risk_profile, ensure_finite_prices};
pub use portfolio::{build_portfolio_risk_profile, normalize_weights, weighted_log_returns};
