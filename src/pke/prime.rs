// Primality of field moduli.

use log::trace;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::common::EccError;
use crate::pke::arith::FieldElement;

const ROUNDS: usize = 64;
const SMALL_PRIMES: [u32; 11] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31];

/// Miller-Rabin test with random bases.
///
/// A composite passes with probability at most 4^-64.
pub fn is_probable_prime(n: &BigUint) -> bool {
    if *n < BigUint::from(2u32) {
        return false;
    }
    for p in SMALL_PRIMES {
        if *n == BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    // n-1 = t * 2^k
    let n_minus_one = n - 1u32;
    let k = n_minus_one.trailing_zeros().unwrap_or(0);
    let t = &n_minus_one >> k;
    let two = BigUint::from(2u32);

    let mut rng = ChaCha20Rng::from_entropy();
    'rounds: for round in 0..ROUNDS {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&t, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..k {
            x = &x * &x % n;
            if x == n_minus_one {
                continue 'rounds;
            }
        }
        trace!("round {}: base {} witnesses {} composite", round, a, n);
        return false;
    }
    true
}

/// A prime field, validated once so its elements can be minted freely.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimeField {
    modulus: BigUint,
}

impl PrimeField {
    pub fn new<M: Into<BigInt>>(modulus: M) -> Result<Self, EccError> {
        let modulus: BigInt = modulus.into();
        match modulus.to_biguint() {
            Some(m) if m > BigUint::from(2u32) && is_probable_prime(&m) => {
                Ok(Self { modulus: m })
            }
            _ => Err(EccError::InvalidModulus(modulus)),
        }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn element<V: Into<BigInt>>(&self, value: V) -> Result<FieldElement, EccError> {
        FieldElement::new(value, self.modulus.clone())
    }

    pub fn zero(&self) -> FieldElement {
        FieldElement::reduce(BigUint::zero(), &self.modulus)
    }

    pub fn one(&self) -> FieldElement {
        FieldElement::reduce(BigUint::one(), &self.modulus)
    }

    pub fn contains(&self, t: &FieldElement) -> bool {
        *t.modulus() == self.modulus
    }
}

#[test]
fn test_is_prime() {
    for p in [2u32, 3, 13, 31, 37, 41, 223, 7919, 65537] {
        assert!(is_probable_prime(&BigUint::from(p)), "{} is prime", p);
    }
    // 561 and 1105 are Carmichael numbers: they fool the plain Fermat test.
    for c in [0u32, 1, 4, 221, 561, 1105, 41 * 43] {
        assert!(!is_probable_prime(&BigUint::from(c)), "{} is composite", c);
    }
}

#[test]
fn test_is_prime_secp256k1() {
    // p = 2^256 - 2^32 - 977
    let p = (BigUint::one() << 256u32) - (BigUint::one() << 32u32) - 977u32;
    assert!(is_probable_prime(&p));
    assert!(!is_probable_prime(&(p + 2u32)));
}

#[test]
fn test_prime_field() {
    let f = PrimeField::new(223).unwrap();
    assert_eq!(f.modulus(), &BigUint::from(223u32));
    assert_eq!(f.element(17).unwrap(), FieldElement::new(17, 223).unwrap());
    assert!(f.zero().is_zero());
    assert_eq!(f.one().value(), &BigUint::one());
    assert!(f.contains(&f.one()));
    assert!(!f.contains(&FieldElement::new(1, 13).unwrap()));
    assert!(matches!(
        f.element(223),
        Err(EccError::OutOfRange { .. })
    ));

    assert_eq!(PrimeField::new(221), Err(EccError::InvalidModulus(221.into())));
    assert_eq!(PrimeField::new(2), Err(EccError::InvalidModulus(2.into())));
    assert_eq!(PrimeField::new(-7), Err(EccError::InvalidModulus((-7).into())));
}
