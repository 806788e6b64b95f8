//! swell-decision — collapses the events fired in one evaluation cycle
//! into a single scaling recommendation.

pub mod resolver;

pub use resolver::{Recommendation, resolve};
