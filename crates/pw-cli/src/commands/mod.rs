pub mod eval;
pub mod sparks;
