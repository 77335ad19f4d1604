use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ecarith::{Curve, CurvePoint, PrimeField};
use log::debug;
use num_bigint::{BigInt, BigUint};
use serde::Deserialize;
use std::{fs, path::PathBuf, str::FromStr};

/// Elliptic curve calculator over prime fields.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Curve description file, default to ./curve.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Integers are decimal strings so they can exceed 64 bits.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub modulus: String,
    pub a: String,
    pub b: String,
    #[serde(default)]
    pub points: Vec<[String; 2]>,
    pub scalar: Option<String>,
}

#[derive(Debug)]
struct Evaluation {
    points: Vec<CurvePoint>,
    sum: CurvePoint,
    multiple: Option<(BigUint, CurvePoint)>,
}

fn parse_int(name: &str, s: &str) -> Result<BigInt> {
    BigInt::from_str(s.trim())
        .with_context(|| format!("{} is not a decimal integer: {:?}", name, s))
}

fn evaluate(config: &Config) -> Result<Evaluation> {
    let field = PrimeField::new(parse_int("modulus", &config.modulus)?)
        .context("modulus is not usable")?;
    let curve = Curve::new(
        field.element(parse_int("a", &config.a)?)?,
        field.element(parse_int("b", &config.b)?)?,
    )?;
    debug!(
        "curve y^2 = x^3 + {}x + {} over F_{}",
        config.a,
        config.b,
        field.modulus()
    );

    let mut points = vec![];
    for (i, [x, y]) in config.points.iter().enumerate() {
        let x = field.element(parse_int("x", x)?)?;
        let y = field.element(parse_int("y", y)?)?;
        let p = curve.point(x, y).with_context(|| format!("point #{}", i))?;
        points.push(p);
    }

    let mut sum = curve.identity();
    for p in &points {
        sum = sum.checked_add(p)?;
    }

    let multiple = match &config.scalar {
        Some(k) => {
            let k = BigUint::from_str(k.trim())
                .with_context(|| format!("scalar is not a non-negative integer: {:?}", k))?;
            let first = points
                .first()
                .ok_or_else(|| anyhow!("scalar given but no points to multiply"))?;
            let kp = first.scalar_mul(&k)?;
            Some((k, kp))
        }
        None => None,
    };

    Ok(Evaluation {
        points,
        sum,
        multiple,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let full_path = args.config.unwrap_or_else(|| PathBuf::from("curve.toml"));
    let config = fs::read_to_string(&full_path)
        .with_context(|| format!("failed to read {}", full_path.display()))?;
    let config: Config = toml::from_str(&config)
        .with_context(|| format!("failed to parse {}", full_path.display()))?;

    let eval = evaluate(&config)?;
    for (i, p) in eval.points.iter().enumerate() {
        println!("P{} = {}", i, p);
    }
    println!("sum = {}", eval.sum);
    if let Some((k, kp)) = eval.multiple {
        println!("{} * P0 = {}", k, kp);
    }
    Ok(())
}

#[test]
fn test_evaluate() {
    let config: Config = toml::from_str(
        r#"
        modulus = "223"
        a = "0"
        b = "7"
        points = [["192", "105"], ["17", "56"]]
        scalar = "7"
        "#,
    )
    .unwrap();
    let eval = evaluate(&config).unwrap();
    assert_eq!(eval.points.len(), 2);
    assert_eq!(
        eval.sum.to_string(),
        "Point(FieldElement_223(170),FieldElement_223(142))_FieldElement_223(0)_FieldElement_223(7)"
    );
    let (k, kp) = eval.multiple.unwrap();
    assert_eq!(k, BigUint::from(7u32));
    // (192, 105) has order 42, so 7P is finite.
    assert!(!kp.is_infinity());
}

#[test]
fn test_evaluate_rejects() {
    let parse = |s: &str| -> Config { toml::from_str(s).unwrap() };

    let composite = parse("modulus = \"221\"\na = \"0\"\nb = \"7\"");
    assert!(evaluate(&composite).is_err());

    let off_curve =
        parse("modulus = \"223\"\na = \"0\"\nb = \"7\"\npoints = [[\"200\", \"119\"]]");
    let err = evaluate(&off_curve).unwrap_err();
    assert!(format!("{:#}", err).contains("not on the curve"));

    let lonely_scalar = parse("modulus = \"223\"\na = \"0\"\nb = \"7\"\nscalar = \"3\"");
    assert!(evaluate(&lonely_scalar).is_err());

    let empty = parse("modulus = \"223\"\na = \"0\"\nb = \"7\"");
    assert!(evaluate(&empty).unwrap().sum.is_infinity());
}
