pub mod arith;
pub mod curve;
pub mod prime;
