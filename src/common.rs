use num_bigint::BigInt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EccError {
    #[error("num {value} not in field range [0, {modulus})")]
    OutOfRange { value: BigInt, modulus: BigInt },
    #[error("invalid modulus {0}: expected a prime greater than 2")]
    InvalidModulus(BigInt),
    #[error("cannot combine numbers from fields of order {left} and {right}")]
    FieldMismatch { left: BigInt, right: BigInt },
    #[error("division by zero.")]
    DivisionByZero,
    #[error("({x}, {y}) is not on the curve")]
    NotOnCurve { x: String, y: String },
    #[error("points {left}, {right} are not on the same curve")]
    CurveMismatch { left: String, right: String },
}
