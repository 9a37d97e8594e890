//! Reference-counted and exclusive smart pointer primitives: a strong
//! shared pointer [`Shared`], its non-owning observer [`Weak`], and a
//! move-only unique pointer [`Unique`]. The shared pair coordinates object
//! and control-block lifetime through a pair of atomic counters.

mod counted;
mod strongs;
mod uniques;
mod weaks;

pub use strongs::*;
pub use uniques::*;
pub use weaks::*;
