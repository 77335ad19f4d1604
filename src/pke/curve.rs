// Operations over short Weierstrass curves.
// y^2 = x^3 + ax + b mod p
// Points are affine; the point at infinity is the group identity.
use log::debug;
use num_bigint::BigUint;
use std::{fmt, ops::Neg};

use crate::common::EccError;
use crate::pke::arith::FieldElement;

/// Curve parameters `a`, `b`, both in one field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Curve {
    a: FieldElement,
    b: FieldElement,
}

impl Curve {
    pub fn new(a: FieldElement, b: FieldElement) -> Result<Self, EccError> {
        a.ensure_same_field(&b)?;
        Ok(Self { a, b })
    }

    pub fn a(&self) -> &FieldElement {
        &self.a
    }

    pub fn b(&self) -> &FieldElement {
        &self.b
    }

    pub fn modulus(&self) -> &BigUint {
        self.a.modulus()
    }

    /// Check `y^2 = x^3 + ax + b`.
    pub fn contains(&self, x: &FieldElement, y: &FieldElement) -> Result<bool, EccError> {
        self.a.ensure_same_field(x)?;
        self.a.ensure_same_field(y)?;
        let lhs = y.pow(2);
        let rhs = x
            .pow(3)
            .checked_add(&self.a.checked_mul(x)?)?
            .checked_add(&self.b)?;
        Ok(lhs == rhs)
    }

    pub fn point(&self, x: FieldElement, y: FieldElement) -> Result<CurvePoint, EccError> {
        if !self.contains(&x, &y)? {
            return Err(EccError::NotOnCurve {
                x: x.to_string(),
                y: y.to_string(),
            });
        }
        Ok(CurvePoint {
            coordinates: Coordinates::Finite { x, y },
            curve: self.clone(),
        })
    }

    pub fn identity(&self) -> CurvePoint {
        CurvePoint {
            coordinates: Coordinates::Infinity,
            curve: self.clone(),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.a, self.b)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Coordinates {
    Infinity,
    Finite { x: FieldElement, y: FieldElement },
}

/// This struct describes a point on a Weierstrass curve.
///
/// It can only be built through `new`, `infinity` or `Curve::point`, so a
/// finite point is always on its curve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CurvePoint {
    coordinates: Coordinates,
    curve: Curve,
}

impl CurvePoint {
    pub fn new(
        x: FieldElement,
        y: FieldElement,
        a: FieldElement,
        b: FieldElement,
    ) -> Result<Self, EccError> {
        Curve::new(a, b)?.point(x, y)
    }

    pub fn infinity(a: FieldElement, b: FieldElement) -> Result<Self, EccError> {
        Ok(Curve::new(a, b)?.identity())
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self.coordinates, Coordinates::Infinity)
    }

    pub fn x(&self) -> Option<&FieldElement> {
        match &self.coordinates {
            Coordinates::Finite { x, .. } => Some(x),
            Coordinates::Infinity => None,
        }
    }

    pub fn y(&self) -> Option<&FieldElement> {
        match &self.coordinates {
            Coordinates::Finite { y, .. } => Some(y),
            Coordinates::Infinity => None,
        }
    }

    /// The group law.
    ///
    /// The vertical-line case (`x1 == x2`, `y1 == -y2`) is settled before any
    /// slope is computed, so doubling never sees `y1 == 0`.
    pub fn checked_add(&self, other: &Self) -> Result<Self, EccError> {
        if self.curve != other.curve {
            return Err(EccError::CurveMismatch {
                left: self.to_string(),
                right: other.to_string(),
            });
        }

        let (x1, y1, x2, y2) = match (&self.coordinates, &other.coordinates) {
            (Coordinates::Infinity, _) => return Ok(other.clone()),
            (_, Coordinates::Infinity) => return Ok(self.clone()),
            (Coordinates::Finite { x: x1, y: y1 }, Coordinates::Finite { x: x2, y: y2 }) => {
                (x1, y1, x2, y2)
            }
        };

        if x1 == x2 && y1.checked_add(y2)?.is_zero() {
            debug!("{} + {}: vertical line", self, other);
            return Ok(self.curve.identity());
        }

        let s = if x1 != x2 {
            // s = (y2 - y1) / (x2 - x1)
            y2.checked_sub(y1)?.checked_div(&x2.checked_sub(x1)?)?
        } else {
            // Same x and not opposite y: the points are equal, so use the tangent.
            // s = (3x1^2 + a) / 2y1
            debug_assert_eq!(y1, y2);
            x1.pow(2)
                .scale(3)
                .checked_add(&self.curve.a)?
                .checked_div(&y1.scale(2))?
        };

        // x3 = s^2 - x1 - x2, y3 = s(x1 - x3) - y1
        let x3 = s.pow(2).checked_sub(x1)?.checked_sub(x2)?;
        let y3 = s.checked_mul(&x1.checked_sub(&x3)?)?.checked_sub(y1)?;
        self.curve.point(x3, y3)
    }

    pub fn double(&self) -> Result<Self, EccError> {
        self.checked_add(self)
    }

    /// Compute k*P by binary double-and-add. Not constant time.
    pub fn scalar_mul(&self, k: &BigUint) -> Result<Self, EccError> {
        let mut ret = self.curve.identity();
        let mut current = self.clone();
        let bits = k.bits();
        for i in 0..bits {
            if k.bit(i) {
                ret = ret.checked_add(&current)?;
            }
            if i + 1 < bits {
                current = current.double()?;
            }
        }
        Ok(ret)
    }
}

impl Neg for &CurvePoint {
    type Output = CurvePoint;
    fn neg(self) -> Self::Output {
        let coordinates = match &self.coordinates {
            Coordinates::Infinity => Coordinates::Infinity,
            Coordinates::Finite { x, y } => Coordinates::Finite {
                x: x.clone(),
                y: -y,
            },
        };
        CurvePoint {
            coordinates,
            curve: self.curve.clone(),
        }
    }
}

impl Neg for CurvePoint {
    type Output = CurvePoint;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coordinates {
            Coordinates::Infinity => write!(f, "Point(infinity)"),
            Coordinates::Finite { x, y } => write!(f, "Point({},{})_{}", x, y, self.curve),
        }
    }
}

#[cfg(test)]
fn secp_like() -> Curve {
    let a = FieldElement::new(0, 223).unwrap();
    let b = FieldElement::new(7, 223).unwrap();
    Curve::new(a, b).unwrap()
}

#[cfg(test)]
fn point(x: i64, y: i64) -> CurvePoint {
    let f = |v: i64| FieldElement::new(v, 223).unwrap();
    secp_like().point(f(x), f(y)).unwrap()
}

#[test]
fn test_on_curve() {
    let curve = secp_like();
    let f = |v: i64| FieldElement::new(v, 223).unwrap();
    for (x, y) in [(192, 105), (17, 56), (1, 193)] {
        assert!(curve.point(f(x), f(y)).is_ok());
    }
    for (x, y) in [(200, 119), (42, 99)] {
        assert_eq!(
            curve.point(f(x), f(y)),
            Err(EccError::NotOnCurve {
                x: f(x).to_string(),
                y: f(y).to_string()
            })
        );
    }
    let other = FieldElement::new(1, 13).unwrap();
    assert!(matches!(
        curve.point(other.clone(), other),
        Err(EccError::FieldMismatch { .. })
    ));
    assert!(matches!(
        Curve::new(f(0), FieldElement::new(7, 13).unwrap()),
        Err(EccError::FieldMismatch { .. })
    ));
}

#[test]
fn test_add_chord() {
    for ((x1, y1), (x2, y2), (x3, y3)) in [
        ((192, 105), (17, 56), (170, 142)),
        ((170, 142), (60, 139), (220, 181)),
        ((47, 71), (17, 56), (215, 68)),
        ((143, 98), (76, 66), (47, 71)),
    ] {
        let sum = point(x1, y1).checked_add(&point(x2, y2)).unwrap();
        assert_eq!(sum, point(x3, y3));
    }
}

#[test]
fn test_add_doubling() {
    assert_eq!(point(1, 193).double().unwrap(), point(61, 33));
    assert_eq!(point(47, 71).double().unwrap(), point(36, 111));
    assert_eq!(point(192, 105).double().unwrap(), point(49, 71));
}

#[test]
fn test_identity_and_inverse() {
    let curve = secp_like();
    let o = curve.identity();
    let p = point(47, 71);
    assert_eq!(p.checked_add(&o).unwrap(), p);
    assert_eq!(o.checked_add(&p).unwrap(), p);
    assert_eq!(o.checked_add(&o).unwrap(), o);
    assert_eq!(p.checked_add(&-&p).unwrap(), o);
    assert_eq!(-&o, o);
    assert!(o.is_infinity());
    assert_eq!(o.x(), None);
    assert_eq!(p.x(), Some(&FieldElement::new(47, 223).unwrap()));
    assert_eq!(p.y(), Some(&FieldElement::new(71, 223).unwrap()));
    assert_eq!(o.coordinates(), &Coordinates::Infinity);
    assert_eq!(p.curve(), o.curve());
    assert_eq!(p.curve().modulus(), &BigUint::from(223u32));
}

#[test]
fn test_two_torsion_point() {
    // y^2 = x^3 - x over F_13 has (1, 0); doubling it must not divide by zero.
    let f = |v: i64| FieldElement::new(v, 13).unwrap();
    let curve = Curve::new(f(12), f(0)).unwrap();
    let p = curve.point(f(1), f(0)).unwrap();
    assert_eq!(p.double().unwrap(), curve.identity());
    assert_eq!(p.checked_add(&-&p).unwrap(), curve.identity());
}

#[test]
fn test_curve_mismatch() {
    let f = |v: i64| FieldElement::new(v, 223).unwrap();
    let p = point(192, 105);
    let other_curve = Curve::new(f(0), f(5)).unwrap();
    let o = other_curve.identity();
    assert_eq!(
        p.checked_add(&o),
        Err(EccError::CurveMismatch {
            left: p.to_string(),
            right: o.to_string()
        })
    );
    assert!(matches!(
        secp_like().identity().checked_add(&o),
        Err(EccError::CurveMismatch { .. })
    ));
}

#[test]
fn test_scalar_mul() {
    let p = point(15, 86);
    let mut acc = secp_like().identity();
    for k in 0u32..=16 {
        assert_eq!(p.scalar_mul(&BigUint::from(k)).unwrap(), acc);
        acc = acc.checked_add(&p).unwrap();
    }
    assert_eq!(p.scalar_mul(&BigUint::from(3u32)).unwrap(), point(69, 137));
    assert!(p.scalar_mul(&BigUint::from(7u32)).unwrap().is_infinity());
}

#[test]
fn test_display() {
    assert_eq!(secp_like().identity().to_string(), "Point(infinity)");
    assert_eq!(
        point(17, 56).to_string(),
        "Point(FieldElement_223(17),FieldElement_223(56))_FieldElement_223(0)_FieldElement_223(7)"
    );
}
