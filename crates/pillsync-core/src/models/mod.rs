//! Domain models for the pillsync system.

mod contact;
mod matching;
mod medicine;
mod verification;

pub use contact::*;
pub use matching::*;
pub use medicine::*;
pub use verification::*;
