//! Hardening-law model implementations.
//!
//! Each law is a small value type implementing [`HardeningLaw`] so that the
//! fitting/scoring/sampling code in `crate::fit` can stay generic.

pub mod ludwik;
pub mod model;
pub mod swift;
pub mod voce;

pub use ludwik::Ludwik;
pub use model::{FittedLaw, HardeningLaw};
pub use swift::Swift;
pub use voce::Voce;
