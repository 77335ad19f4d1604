//! Prime field arithmetic and the group law of short Weierstrass curves.
//!
//! `FieldElement` is a residue modulo a prime, `CurvePoint` a point on
//! `y^2 = x^3 + ax + b` over that field (or the point at infinity).
//! Every fallible operation returns `Result<_, EccError>`.
pub mod common;
pub mod pke;

pub use common::EccError;
pub use pke::arith::FieldElement;
pub use pke::curve::{Coordinates, Curve, CurvePoint};
pub use pke::prime::{is_probable_prime, PrimeField};
