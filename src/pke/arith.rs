use crate::common::EccError;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::{fmt, ops::Neg};

/// This struct stores a number over Z_p for an arbitrary prime p.
///
/// `value` is always kept in `[0, modulus)`. Every operation returns a new
/// item; binary operations fail if the operands live in different fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldElement {
    value: BigUint,
    modulus: BigUint,
}

impl FieldElement {
    /// Fails with `OutOfRange` unless `0 <= value < modulus`.
    ///
    /// The modulus is assumed prime; only `modulus > 2` is checked here.
    /// Use `PrimeField` to have primality verified once for a whole field.
    pub fn new<V, M>(value: V, modulus: M) -> Result<Self, EccError>
    where
        V: Into<BigInt>,
        M: Into<BigInt>,
    {
        let value: BigInt = value.into();
        let modulus: BigInt = modulus.into();
        if modulus <= BigInt::from(2) {
            return Err(EccError::InvalidModulus(modulus));
        }
        if value.is_negative() || value >= modulus {
            return Err(EccError::OutOfRange { value, modulus });
        }
        Ok(Self {
            value: value.into_parts().1,
            modulus: modulus.into_parts().1,
        })
    }

    /// Reduce an unsigned value into the field. The caller vouches for the modulus.
    pub(crate) fn reduce(value: BigUint, modulus: &BigUint) -> Self {
        Self {
            value: value % modulus,
            modulus: modulus.clone(),
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn same_field(&self, other: &Self) -> bool {
        self.modulus == other.modulus
    }

    pub(crate) fn ensure_same_field(&self, other: &Self) -> Result<(), EccError> {
        if self.same_field(other) {
            Ok(())
        } else {
            Err(EccError::FieldMismatch {
                left: BigInt::from(self.modulus.clone()),
                right: BigInt::from(other.modulus.clone()),
            })
        }
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, EccError> {
        self.ensure_same_field(other)?;
        Ok(Self::reduce(&self.value + &other.value, &self.modulus))
    }

    /// Always lands in `[0, p)`: p is added before subtracting.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, EccError> {
        self.ensure_same_field(other)?;
        Ok(Self::reduce(
            &self.value + &self.modulus - &other.value,
            &self.modulus,
        ))
    }

    pub fn checked_mul(&self, other: &Self) -> Result<Self, EccError> {
        self.ensure_same_field(other)?;
        Ok(Self::reduce(&self.value * &other.value, &self.modulus))
    }

    /// Multiply by a small integer, e.g. the `3` in `3x^2`.
    pub fn scale(&self, k: u32) -> Self {
        Self::reduce(&self.value * k, &self.modulus)
    }

    /// `self^exponent` for any signed exponent.
    ///
    /// a^(p-1) = 1 for non-zero a, so the exponent is reduced modulo p-1 first,
    /// which also turns negative exponents into positive ones.
    /// `0^0` evaluates to 1.
    pub fn pow<E: Into<BigInt>>(&self, exponent: E) -> Self {
        let exponent: BigInt = exponent.into();
        let order = BigInt::from_biguint(Sign::Plus, &self.modulus - 1u32);
        let (_, n) = exponent.mod_floor(&order).into_parts();
        Self {
            value: self.value.modpow(&n, &self.modulus),
            modulus: self.modulus.clone(),
        }
    }

    /// inverse: Get multiplicational reverse.
    /// since p is a prime, there is a^(p-1) = 1
    /// therefore, we have a*a^(p-2) = 1, so a^(p-2) is the inverse.
    pub fn inverse(&self) -> Result<Self, EccError> {
        if self.is_zero() {
            return Err(EccError::DivisionByZero);
        }
        let exponent = &self.modulus - 2u32;
        Ok(Self {
            value: self.value.modpow(&exponent, &self.modulus),
            modulus: self.modulus.clone(),
        })
    }

    pub fn checked_div(&self, other: &Self) -> Result<Self, EccError> {
        self.ensure_same_field(other)?;
        self.checked_mul(&other.inverse()?)
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;
    fn neg(self) -> Self::Output {
        FieldElement::reduce(&self.modulus - &self.value, &self.modulus)
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement_{}({})", self.modulus, self.value)
    }
}

#[cfg(test)]
fn fe(value: i64) -> FieldElement {
    FieldElement::new(value, 223).unwrap()
}

#[test]
fn test_new_range() {
    assert!(FieldElement::new(0, 223).is_ok());
    assert!(FieldElement::new(222, 223).is_ok());
    assert_eq!(
        FieldElement::new(223, 223),
        Err(EccError::OutOfRange {
            value: 223.into(),
            modulus: 223.into()
        })
    );
    assert!(matches!(
        FieldElement::new(-1, 223),
        Err(EccError::OutOfRange { .. })
    ));
    assert_eq!(
        FieldElement::new(0, 2),
        Err(EccError::InvalidModulus(2.into()))
    );
}

#[test]
fn test_equality() {
    assert_eq!(fe(7), fe(7));
    assert_ne!(fe(7), fe(8));
    assert_ne!(fe(7), FieldElement::new(7, 13).unwrap());
}

#[test]
fn test_add_sub() {
    let a = FieldElement::new(7, 13).unwrap();
    let b = FieldElement::new(12, 13).unwrap();
    assert_eq!(a.checked_add(&b).unwrap(), FieldElement::new(6, 13).unwrap());
    // 7 - 12 = -5 = 8 mod 13
    assert_eq!(a.checked_sub(&b).unwrap(), FieldElement::new(8, 13).unwrap());
    assert_eq!(fe(29).checked_sub(&fe(4)).unwrap(), fe(25));
    assert_eq!(fe(15).checked_sub(&fe(30)).unwrap(), fe(208));
}

#[test]
fn test_mul_pow() {
    let a = FieldElement::new(3, 13).unwrap();
    let b = FieldElement::new(12, 13).unwrap();
    assert_eq!(a.checked_mul(&b).unwrap(), FieldElement::new(10, 13).unwrap());
    assert_eq!(a.pow(3), FieldElement::new(1, 13).unwrap());
    assert_eq!(
        FieldElement::new(7, 13).unwrap().pow(-3),
        FieldElement::new(8, 13).unwrap()
    );
    assert_eq!(
        FieldElement::new(17, 31).unwrap().pow(-3),
        FieldElement::new(29, 31).unwrap()
    );
    assert_eq!(fe(0).pow(0), fe(1));
    assert_eq!(fe(0).pow(5), fe(0));
}

#[test]
fn test_div() {
    let a = FieldElement::new(3, 31).unwrap();
    let b = FieldElement::new(24, 31).unwrap();
    assert_eq!(a.checked_div(&b).unwrap(), FieldElement::new(4, 31).unwrap());
    assert_eq!(fe(5).checked_div(&fe(0)), Err(EccError::DivisionByZero));
    assert_eq!(fe(0).inverse(), Err(EccError::DivisionByZero));
}

#[test]
fn test_field_mismatch() {
    let a = FieldElement::new(3, 31).unwrap();
    let b = FieldElement::new(3, 13).unwrap();
    let err = EccError::FieldMismatch {
        left: 31.into(),
        right: 13.into(),
    };
    assert_eq!(a.checked_add(&b), Err(err.clone()));
    assert_eq!(a.checked_sub(&b), Err(err.clone()));
    assert_eq!(a.checked_mul(&b), Err(err.clone()));
    assert_eq!(a.checked_div(&b), Err(err));
    // mismatch wins over the zero divisor
    let zero = FieldElement::new(0, 13).unwrap();
    assert!(matches!(
        a.checked_div(&zero),
        Err(EccError::FieldMismatch { .. })
    ));
}

#[test]
fn test_neg_and_display() {
    assert_eq!(-fe(5), fe(218));
    assert_eq!(-fe(0), fe(0));
    assert_eq!(fe(5).scale(50), fe(27));
    assert_eq!(fe(5).to_string(), "FieldElement_223(5)");
}

#[cfg(test)]
mod tests {
    use super::FieldElement;
    use num_bigint::BigUint;
    use proptest::prelude::*;

    const P: u64 = 223;

    fn elem(v: u64) -> FieldElement {
        FieldElement::new(v, P).unwrap()
    }

    proptest! {
        #[test]
        fn closure(a in 0..P, b in 0..P) {
            let (a, b) = (elem(a), elem(b));
            for r in [
                a.checked_add(&b).unwrap(),
                a.checked_sub(&b).unwrap(),
                a.checked_mul(&b).unwrap(),
            ] {
                prop_assert!(r.value() < r.modulus());
            }
        }

        #[test]
        fn additive_identity(a in 0..P) {
            let a = elem(a);
            let zero = a.checked_sub(&a).unwrap();
            prop_assert!(zero.is_zero());
            prop_assert_eq!(a.checked_add(&zero).unwrap(), a.clone());
            prop_assert!(a.checked_add(&-&a).unwrap().is_zero());
        }

        #[test]
        fn division_undoes_multiplication(a in 1..P, b in 1..P) {
            let (a, b) = (elem(a), elem(b));
            prop_assert_eq!(a.checked_mul(&a).unwrap().checked_div(&a).unwrap(), a.clone());
            prop_assert_eq!(a.checked_mul(&b).unwrap().checked_div(&b).unwrap(), a);
        }

        #[test]
        fn fermat(a in 1..P, k in -5i64..5) {
            let a = elem(a);
            let r = a.pow(P - 1);
            prop_assert_eq!(r.value(), &BigUint::from(1u32));
            // exponents congruent mod p-1 agree
            prop_assert_eq!(a.pow(k), a.pow(k + (P as i64 - 1)));
        }
    }
}
