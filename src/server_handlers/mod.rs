pub mod solve;
pub mod docs;

pub use solve::*;
pub use docs::*;
