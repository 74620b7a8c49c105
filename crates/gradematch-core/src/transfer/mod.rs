//! Reference-driven color transfer in CIE LAB.
//!
//! Each strategy is fitted once from a (reference, target) pair and then
//! evaluated pointwise; see [`FittedTransfer`].

pub mod engine;
pub mod global;
pub mod histogram;
pub mod method;
pub mod zone;

pub use engine::{blend, grade_lab, grade_rgb, transfer};
pub use method::FittedTransfer;
