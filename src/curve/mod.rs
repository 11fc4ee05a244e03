//! Stress-strain data: raw selection and the nominal → true/plastic transform.

pub mod raw;
pub mod transform;

pub use raw::{RawSample, RawTable};
pub use transform::*;
