use ecarith::{Curve, CurvePoint, EccError, FieldElement, PrimeField};
use hex::FromHex;
use num_bigint::BigUint;
use proptest::prelude::*;
use std::thread;

const P: u64 = 223;

fn fe(v: u64) -> FieldElement {
    FieldElement::new(v, P).unwrap()
}

fn curve() -> Curve {
    Curve::new(fe(0), fe(7)).unwrap()
}

fn point(x: u64, y: u64) -> CurvePoint {
    CurvePoint::new(fe(x), fe(y), fe(0), fe(7)).unwrap()
}

fn from_hex(s: &str) -> BigUint {
    BigUint::from_bytes_be(&<[u8; 32]>::from_hex(s).unwrap())
}

#[test]
fn regression_vectors() {
    assert_eq!(
        point(192, 105).checked_add(&point(17, 56)).unwrap(),
        point(170, 142)
    );
    assert_eq!(point(1, 193).checked_add(&point(1, 193)).unwrap(), point(61, 33));
    assert_eq!(point(47, 71).double().unwrap(), point(36, 111));
}

#[test]
fn construction_matches_curve_equation() {
    let (a, b) = (fe(0), fe(7));
    for x in 0..P {
        for y in [0, 1, 56, 105, 193] {
            let (x, y) = (fe(x), fe(y));
            let rhs = x
                .pow(3)
                .checked_add(&a.checked_mul(&x).unwrap())
                .unwrap()
                .checked_add(&b)
                .unwrap();
            let on_curve = y.pow(2) == rhs;
            let built = CurvePoint::new(x, y, a.clone(), b.clone());
            assert_eq!(built.is_ok(), on_curve);
            if !on_curve {
                assert!(matches!(built, Err(EccError::NotOnCurve { .. })));
            }
        }
    }
}

#[test]
fn infinity_constructor() {
    let o = CurvePoint::infinity(fe(0), fe(7)).unwrap();
    assert_eq!(o, curve().identity());
    assert_eq!(o.to_string(), "Point(infinity)");
    let p = point(17, 56);
    assert_eq!(p.checked_add(&o).unwrap(), p);
    assert_eq!(o.checked_add(&p).unwrap(), p);
    assert!(matches!(
        CurvePoint::infinity(fe(0), FieldElement::new(7, 13).unwrap()),
        Err(EccError::FieldMismatch { .. })
    ));
}

#[test]
fn inverse_point() {
    for (x, y) in [(192, 105), (17, 56), (1, 193), (47, 71)] {
        let p = point(x, y);
        let reflected = CurvePoint::new(fe(x), -fe(y), fe(0), fe(7)).unwrap();
        assert_eq!(reflected, -&p);
        assert!(p.checked_add(&reflected).unwrap().is_infinity());
    }
}

#[test]
fn mismatched_curves_are_rejected() {
    let p = point(192, 105);
    let q = CurvePoint::infinity(fe(0), fe(5)).unwrap();
    assert!(matches!(
        p.checked_add(&q),
        Err(EccError::CurveMismatch { .. })
    ));
    assert!(matches!(
        q.checked_add(&p),
        Err(EccError::CurveMismatch { .. })
    ));
}

#[test]
fn subgroup_order() {
    let g = point(15, 86);
    assert!(g.scalar_mul(&BigUint::from(7u32)).unwrap().is_infinity());
    assert_eq!(g.scalar_mul(&BigUint::from(8u32)).unwrap(), g);
    assert!(g.scalar_mul(&BigUint::from(0u32)).unwrap().is_infinity());
}

#[test]
fn secp256k1_generator() {
    let p = from_hex("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f");
    let gx = from_hex("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
    let gy = from_hex("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8");
    let n = from_hex("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");

    let field = PrimeField::new(p).unwrap();
    let curve = Curve::new(field.zero(), field.element(7).unwrap()).unwrap();
    let g = curve
        .point(field.element(gx).unwrap(), field.element(gy).unwrap())
        .unwrap();

    assert!(g.scalar_mul(&n).unwrap().is_infinity());
    assert_eq!(g.scalar_mul(&(&n - 1u32)).unwrap(), -&g);
}

#[test]
fn shared_across_threads() {
    let g = point(47, 71);
    let handles: Vec<_> = (1u32..=4)
        .map(|k| {
            let g = g.clone();
            thread::spawn(move || g.scalar_mul(&BigUint::from(k)).unwrap())
        })
        .collect();
    let mut acc = curve().identity();
    for h in handles {
        acc = acc.checked_add(&g).unwrap();
        assert_eq!(h.join().unwrap(), acc);
    }
}

fn any_point() -> impl Strategy<Value = CurvePoint> {
    // Every point of the order-21 subgroup generated by (47, 71), infinity included.
    (0u32..21).prop_map(|k| point(47, 71).scalar_mul(&BigUint::from(k)).unwrap())
}

proptest! {
    #[test]
    fn commutative(p in any_point(), q in any_point()) {
        prop_assert_eq!(p.checked_add(&q).unwrap(), q.checked_add(&p).unwrap());
    }

    #[test]
    fn associative(p in any_point(), q in any_point(), r in any_point()) {
        let left = p.checked_add(&q).unwrap().checked_add(&r).unwrap();
        let right = p.checked_add(&q.checked_add(&r).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn identity(p in any_point()) {
        let o = curve().identity();
        prop_assert_eq!(p.checked_add(&o).unwrap(), p.clone());
        prop_assert_eq!(o.checked_add(&p).unwrap(), p);
    }

    #[test]
    fn scalar_mul_distributes(j in 0u32..50, k in 0u32..50) {
        let g = point(47, 71);
        let jg = g.scalar_mul(&BigUint::from(j)).unwrap();
        let kg = g.scalar_mul(&BigUint::from(k)).unwrap();
        let sum = g.scalar_mul(&BigUint::from(j + k)).unwrap();
        prop_assert_eq!(jg.checked_add(&kg).unwrap(), sum);
    }
}
