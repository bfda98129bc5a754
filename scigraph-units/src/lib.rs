//! Physical unit parsing and conversion.
//!
//! This is the thin adapter the rest of scigraph calls into for everything
//! unit-related: parsing a unit string, checking whether two units measure
//! the same physical quantity, and converting a scalar value between them.
//! It implements a small SI dimensional-analysis engine internally rather
//! than wrapping a separate crate, but the three-function shape
//! (`parse` / `compatible` / `convert`) is exactly the contract the rest of
//! the system treats as an external collaborator.

use std::collections::HashMap;
use std::ops::{Add, Neg, Sub};

use lazy_static::lazy_static;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("cannot parse unit '{0}'")]
    ParseError(String),
    #[error("units '{from}' and '{to}' are not compatible")]
    Incompatible { from: String, to: String },
}

/// SI base dimension exponents: [length, mass, time, current, temperature, amount, luminosity].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Dim([i8; 7]);

impl Dim {
    const fn zero() -> Self {
        Dim([0; 7])
    }

    fn scaled(self, exp: i32) -> Self {
        let mut out = [0i8; 7];
        for i in 0..7 {
            out[i] = (self.0[i] as i32 * exp) as i8;
        }
        Dim(out)
    }
}

impl Add for Dim {
    type Output = Dim;
    fn add(self, rhs: Dim) -> Dim {
        let mut out = [0i8; 7];
        for i in 0..7 {
            out[i] = self.0[i] + rhs.0[i];
        }
        Dim(out)
    }
}

impl Sub for Dim {
    type Output = Dim;
    fn sub(self, rhs: Dim) -> Dim {
        self + rhs.neg()
    }
}

impl Neg for Dim {
    type Output = Dim;
    fn neg(self) -> Dim {
        self.scaled(-1)
    }
}

/// A parsed, canonicalized unit: its SI dimension vector and the scale
/// factor that converts one unit of it into SI base units.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    text: String,
    dims: Dim,
    si_scale: f64,
}

impl Unit {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dimensionless() -> Self {
        Unit {
            text: String::new(),
            dims: Dim::zero(),
            si_scale: 1.0,
        }
    }
}

lazy_static! {
    static ref PREFIXES: Vec<(&'static str, f64)> = vec![
        ("da", 1e1),
        ("k", 1e3),
        ("h", 1e2),
        ("d", 1e-1),
        ("c", 1e-2),
        ("u", 1e-6),
        ("n", 1e-9),
        ("M", 1e6),
        ("G", 1e9),
        ("T", 1e12),
        ("p", 1e-12),
        ("m", 1e-3),
    ];
    static ref BASE_UNITS: HashMap<&'static str, (Dim, f64)> = {
        let mut m = HashMap::new();
        m.insert("m", (Dim([1, 0, 0, 0, 0, 0, 0]), 1.0));
        m.insert("g", (Dim([0, 1, 0, 0, 0, 0, 0]), 1e-3));
        m.insert("s", (Dim([0, 0, 1, 0, 0, 0, 0]), 1.0));
        m.insert("A", (Dim([0, 0, 0, 1, 0, 0, 0]), 1.0));
        m.insert("K", (Dim([0, 0, 0, 0, 1, 0, 0]), 1.0));
        m.insert("mol", (Dim([0, 0, 0, 0, 0, 1, 0]), 1.0));
        m.insert("cd", (Dim([0, 0, 0, 0, 0, 0, 1]), 1.0));
        m.insert("N", (Dim([1, 1, -2, 0, 0, 0, 0]), 1.0));
        m.insert("Pa", (Dim([-1, 1, -2, 0, 0, 0, 0]), 1.0));
        m.insert("J", (Dim([2, 1, -2, 0, 0, 0, 0]), 1.0));
        m.insert("W", (Dim([2, 1, -3, 0, 0, 0, 0]), 1.0));
        m.insert("Hz", (Dim([0, 0, -1, 0, 0, 0, 0]), 1.0));
        m
    };
}

/// Splits a trailing digit run off a symbol, e.g. "cm3" -> ("cm", 3).
/// An explicit `^exponent` form (e.g. "m^3", "s^-1") takes precedence.
fn split_exponent(tok: &str) -> Result<(&str, i32), UnitsError> {
    if let Some((base, exp)) = tok.split_once('^') {
        let exp: i32 = exp
            .parse()
            .map_err(|_| UnitsError::ParseError(tok.to_string()))?;
        return Ok((base, exp));
    }
    let digits_at = tok
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);
    match digits_at {
        Some(i) if i > 0 => {
            let exp: i32 = tok[i..]
                .parse()
                .map_err(|_| UnitsError::ParseError(tok.to_string()))?;
            Ok((&tok[..i], exp))
        }
        _ => Ok((tok, 1)),
    }
}

fn parse_symbol(sym: &str) -> Option<(Dim, f64)> {
    if let Some((dim, scale)) = BASE_UNITS.get(sym) {
        return Some((*dim, *scale));
    }
    for (prefix, mult) in PREFIXES.iter() {
        if let Some(rest) = sym.strip_prefix(prefix) {
            if let Some((dim, scale)) = BASE_UNITS.get(rest) {
                return Some((*dim, *scale * mult));
            }
        }
    }
    None
}

fn parse_token(tok: &str) -> Result<(Dim, f64), UnitsError> {
    if tok.is_empty() {
        return Err(UnitsError::ParseError(tok.to_string()));
    }
    let (sym, exp) = split_exponent(tok)?;
    let (dim, scale) =
        parse_symbol(sym).ok_or_else(|| UnitsError::ParseError(tok.to_string()))?;
    Ok((dim.scaled(exp), scale.powi(exp)))
}

/// Parses a unit string such as `"m"`, `"kg/m3"`, `"kN*m"`, `"g/cm3"`.
/// An empty string parses to the dimensionless unit.
pub fn parse(s: &str) -> Result<Unit, UnitsError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(Unit::dimensionless());
    }
    let mut dims = Dim::zero();
    let mut scale = 1.0f64;
    let mut op = '*';
    let mut tok = String::new();
    for c in trimmed.chars().chain(std::iter::once('\0')) {
        match c {
            '*' | '/' | '\0' => {
                let (d, sc) = parse_token(&tok)?;
                match op {
                    '*' => {
                        dims = dims + d;
                        scale *= sc;
                    }
                    '/' => {
                        dims = dims - d;
                        scale /= sc;
                    }
                    _ => unreachable!(),
                }
                op = c;
                tok.clear();
            }
            _ => tok.push(c),
        }
    }
    Ok(Unit {
        text: trimmed.to_string(),
        dims,
        si_scale: scale,
    })
}

/// Whether two units measure the same physical quantity.
pub fn compatible(a: &Unit, b: &Unit) -> bool {
    a.dims == b.dims
}

/// Converts `value` expressed in `from` into the equivalent value in `to`.
pub fn convert(value: f64, from: &Unit, to: &Unit) -> Result<f64, UnitsError> {
    if !compatible(from, to) {
        return Err(UnitsError::Incompatible {
            from: from.text.clone(),
            to: to.text.clone(),
        });
    }
    Ok(value * from.si_scale / to.si_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_and_prefixed_units() {
        let m = parse("m").unwrap();
        let mm = parse("mm").unwrap();
        assert!(compatible(&m, &mm));
        assert_eq!(convert(2500.0, &mm, &m).unwrap(), 2.5);
    }

    #[test]
    fn parses_composite_units() {
        let kgm3 = parse("kg/m3").unwrap();
        let gcm3 = parse("g/cm3").unwrap();
        assert!(compatible(&kgm3, &gcm3));
        let converted = convert(3.5, &gcm3, &kgm3).unwrap();
        assert!((converted - 3500.0).abs() < 1e-9);
    }

    #[test]
    fn parses_named_derived_units_with_star() {
        let knm = parse("kN*m").unwrap();
        let nm = parse("N*m").unwrap();
        assert!(compatible(&knm, &nm));
        assert_eq!(convert(1.0, &knm, &nm).unwrap(), 1000.0);
    }

    #[test]
    fn rejects_incompatible_units() {
        let m = parse("m").unwrap();
        let s = parse("s").unwrap();
        assert!(!compatible(&m, &s));
        assert!(convert(1.0, &m, &s).is_err());
    }

    #[test]
    fn rejects_unknown_unit_string() {
        assert!(parse("frobnicate").is_err());
    }

    #[test]
    fn dimensionless_is_compatible_with_itself() {
        let a = parse("").unwrap();
        let b = parse("").unwrap();
        assert!(compatible(&a, &b));
    }
}
