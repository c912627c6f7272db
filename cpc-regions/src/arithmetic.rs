//! Elementwise arithmetic between region sets and scalars.
//!
//! A result region is absent wherever either operand is absent. Operands
//! must be numeric, and two sets must share a scheme.

use std::ops::{Add, Div, Mul, Sub};

use crate::error::{RegionError, Result};
use crate::region_set::RegionSet;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithOp {
    /// Parse an operator symbol; anything but `+ - * /` is `UnsupportedOperator`.
    pub fn from_symbol(symbol: &str) -> Result<ArithOp> {
        match symbol.trim() {
            "+" => Ok(ArithOp::Add),
            "-" => Ok(ArithOp::Subtract),
            "*" => Ok(ArithOp::Multiply),
            "/" => Ok(ArithOp::Divide),
            other => Err(RegionError::UnsupportedOperator(other.to_string())),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
        }
    }

    /// `None` on division by zero.
    fn apply(self, left: f64, right: f64) -> Option<f64> {
        match self {
            ArithOp::Add => Some(left + right),
            ArithOp::Subtract => Some(left - right),
            ArithOp::Multiply => Some(left * right),
            ArithOp::Divide => {
                if right == 0.0 {
                    None
                } else {
                    Some(left / right)
                }
            }
        }
    }
}

/// Right-hand side of an arithmetic operation.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Set(&'a RegionSet),
    Scalar(Value),
}

impl<'a> From<&'a RegionSet> for Operand<'a> {
    fn from(set: &'a RegionSet) -> Self {
        Operand::Set(set)
    }
}

impl From<f64> for Operand<'_> {
    fn from(n: f64) -> Self {
        Operand::Scalar(Value::Number(n))
    }
}

impl From<i32> for Operand<'_> {
    fn from(n: i32) -> Self {
        Operand::Scalar(Value::from(n))
    }
}

impl From<&str> for Operand<'_> {
    fn from(s: &str) -> Self {
        Operand::Scalar(Value::from(s))
    }
}

impl From<Value> for Operand<'_> {
    fn from(v: Value) -> Self {
        Operand::Scalar(v)
    }
}

impl RegionSet {
    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(rhs.into(), ArithOp::Add, false)
    }

    pub fn subtract<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(rhs.into(), ArithOp::Subtract, false)
    }

    pub fn multiply<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(rhs.into(), ArithOp::Multiply, false)
    }

    pub fn divide<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(rhs.into(), ArithOp::Divide, false)
    }

    /// `lhs + self`
    pub fn add_commuted<'a>(&self, lhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(lhs.into(), ArithOp::Add, true)
    }

    /// `lhs - self`
    pub fn subtract_commuted<'a>(&self, lhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(lhs.into(), ArithOp::Subtract, true)
    }

    /// `lhs * self`
    pub fn multiply_commuted<'a>(&self, lhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(lhs.into(), ArithOp::Multiply, true)
    }

    /// `lhs / self`
    pub fn divide_commuted<'a>(&self, lhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        self.combine(lhs.into(), ArithOp::Divide, true)
    }

    /// Apply an operator given by symbol, e.g. from a formula string.
    pub fn apply<'a>(&self, symbol: &str, rhs: impl Into<Operand<'a>>) -> Result<RegionSet> {
        let op = ArithOp::from_symbol(symbol)?;
        self.combine(rhs.into(), op, false)
    }

    fn combine(&self, other: Operand<'_>, op: ArithOp, swapped: bool) -> Result<RegionSet> {
        match other {
            Operand::Set(other) if swapped => other.combine(Operand::Set(self), op, false),
            Operand::Set(other) => self.combine_set(other, op),
            Operand::Scalar(scalar) => self.combine_scalar(&scalar, op, swapped),
        }
    }

    fn combine_set(&self, other: &RegionSet, op: ArithOp) -> Result<RegionSet> {
        if self.scheme_id() != other.scheme_id() || self.ids() != other.ids() {
            return Err(RegionError::SchemeMismatch {
                left: self.scheme_id().clone(),
                right: other.scheme_id().clone(),
            });
        }
        if !self.is_numeric() || !other.is_numeric() {
            return Err(RegionError::NonNumericOperand(format!(
                "{} {} {} on non-numeric region data",
                self.scheme_id(),
                op.symbol(),
                other.scheme_id()
            )));
        }

        let mut values = Vec::with_capacity(self.len());
        for (slot, id) in self.ids().iter().enumerate() {
            let left = self.stored(slot).and_then(Value::as_number);
            let right = other.stored(slot).and_then(Value::as_number);
            let value = match (left, right) {
                (Some(l), Some(r)) => {
                    let result = op.apply(l, r).ok_or_else(|| RegionError::DivisionByZero(id.clone()))?;
                    Some(Value::Number(result))
                }
                _ => None,
            };
            values.push(value);
        }

        // The right operand's sentinel carries over only when the left
        // operand already treats it as missing.
        let sentinel = if self.is_missing_value(other.sentinel()) {
            other.sentinel().cloned()
        } else {
            None
        };
        Ok(RegionSet::from_parts(self.scheme().clone(), values, sentinel))
    }

    fn combine_scalar(&self, scalar: &Value, op: ArithOp, swapped: bool) -> Result<RegionSet> {
        let number = scalar.as_number().ok_or_else(|| {
            RegionError::NonNumericOperand(format!("scalar operand {:?} is not a number", scalar.to_string()))
        })?;
        if !self.is_numeric() {
            return Err(RegionError::NonNumericOperand(format!(
                "{} {} {} on non-numeric region data",
                self.scheme_id(),
                op.symbol(),
                scalar
            )));
        }

        let sentinel = self.sentinel().cloned();
        if self.is_missing_value(Some(scalar)) {
            let values = vec![None; self.len()];
            return Ok(RegionSet::from_parts(self.scheme().clone(), values, sentinel));
        }

        let mut values = Vec::with_capacity(self.len());
        for (slot, id) in self.ids().iter().enumerate() {
            let value = match self.stored(slot).and_then(Value::as_number) {
                Some(n) => {
                    let (l, r) = if swapped { (number, n) } else { (n, number) };
                    let result = op.apply(l, r).ok_or_else(|| RegionError::DivisionByZero(id.clone()))?;
                    Some(Value::Number(result))
                }
                None => None,
            };
            values.push(value);
        }
        Ok(RegionSet::from_parts(self.scheme().clone(), values, sentinel))
    }
}

macro_rules! region_operator {
    ($trait:ident, $method:ident, $inherent:ident, $commuted:ident) => {
        impl $trait<&RegionSet> for &RegionSet {
            type Output = Result<RegionSet>;

            fn $method(self, rhs: &RegionSet) -> Result<RegionSet> {
                RegionSet::$inherent(self, rhs)
            }
        }

        impl $trait<f64> for &RegionSet {
            type Output = Result<RegionSet>;

            fn $method(self, rhs: f64) -> Result<RegionSet> {
                RegionSet::$inherent(self, rhs)
            }
        }

        impl $trait<&RegionSet> for f64 {
            type Output = Result<RegionSet>;

            fn $method(self, rhs: &RegionSet) -> Result<RegionSet> {
                rhs.$commuted(self)
            }
        }
    };
}

region_operator!(Add, add, add, add_commuted);
region_operator!(Sub, sub, subtract, subtract_commuted);
region_operator!(Mul, mul, multiply, multiply_commuted);
region_operator!(Div, div, divide, divide_commuted);
