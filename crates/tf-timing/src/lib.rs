//! # tf-timing
//!
//! Ideal 555 astable timing. The capacitor charges through R1 + R2 and
//! discharges through R2 alone, giving
//!
//! ```text
//! t_high = ln(2) * (R1 + R2) * C
//! t_low  = ln(2) * R2 * C
//! period = ln(2) * (R1 + 2 * R2) * C
//! ```

pub mod astable;

pub use astable::*;
