//! swell-scaler — wires the rule engine, decision resolver, counters, and
//! the scaling executor into one per-payload evaluation cycle.

pub mod scaler;

pub use scaler::{ExecuteCallback, Scaler};
