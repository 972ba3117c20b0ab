//! Arithmetic engine.
//!
//! Interprets payloads of the form `<key><op><value>` where `<op>` is one of
//! `=`, `+=`, `-=`, `*=`, `/=` and `<value>` is a base-10 non-negative
//! integer literal. Stored values are arbitrary-precision non-negative
//! integers encoded as minimal big-endian bytes; a missing key reads as zero.
//!
//! Application is all-or-nothing: the payload is fully parsed and the result
//! fully computed before the single store write, so a rejected command never
//! leaves a partial mutation behind.

use crate::core::error::{StrataError, StrataResult};
use crate::machine::Message;
use crate::store::VersionedStore;
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;

use super::Engine;

/// Operator of an arithmetic command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` replaces the stored value.
    Set,
    /// `+=` adds the operand.
    Add,
    /// `-=` subtracts the operand; going below zero is an error.
    Sub,
    /// `*=` multiplies by the operand.
    Mul,
    /// `/=` divides by the operand (integer division); zero is an error.
    Div,
}

impl Operator {
    /// Wire form of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed, transient representation of a message payload.
///
/// Produced by [`Command::parse`], applied to the store, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Target key. Matches `[A-Za-z0-9_-]*`; the empty key is valid.
    pub variable: String,
    /// Operator.
    pub operator: Operator,
    /// Non-negative operand.
    pub operand: BigUint,
}

impl Command {
    /// Parse a raw payload against the `<key><op><value>` grammar.
    ///
    /// The operator is anchored at the first `=`; a `+`, `-`, `*` or `/`
    /// directly before it is taken as part of a compound operator. This
    /// resolves the ambiguity of `-` being both a key character and the
    /// start of `-=`: `a-=5` subtracts from `a`, while `a-b=3` sets `a-b`.
    pub fn parse(payload: &[u8]) -> StrataResult<Command> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| StrataError::malformed("payload is not valid ASCII text"))?;
        if !text.is_ascii() {
            return Err(StrataError::malformed("payload is not valid ASCII text"));
        }

        let eq = text
            .find('=')
            .ok_or_else(|| StrataError::malformed("no operator in payload"))?;

        let (key, operator) = match text[..eq].as_bytes().last() {
            Some(b'+') => (&text[..eq - 1], Operator::Add),
            Some(b'-') => (&text[..eq - 1], Operator::Sub),
            Some(b'*') => (&text[..eq - 1], Operator::Mul),
            Some(b'/') => (&text[..eq - 1], Operator::Div),
            _ => (&text[..eq], Operator::Set),
        };

        if !key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(StrataError::malformed(format!(
                "key {:?} contains characters outside [A-Za-z0-9_-]",
                key
            )));
        }

        let digits = &text[eq + 1..];
        if digits.is_empty() {
            return Err(StrataError::malformed("empty operand"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StrataError::malformed(format!(
                "operand {:?} is not a base-10 non-negative integer",
                digits
            )));
        }

        let operand = BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| StrataError::malformed(format!("unparsable operand {:?}", digits)))?;

        Ok(Command {
            variable: key.to_string(),
            operator,
            operand,
        })
    }

    /// Compute the value this command produces from the current stored value.
    ///
    /// Fails without side effects on division by zero and on a subtraction
    /// that would go below zero.
    pub fn evaluate(&self, current: &BigUint) -> StrataResult<BigUint> {
        match self.operator {
            Operator::Set => Ok(self.operand.clone()),
            Operator::Add => Ok(current + &self.operand),
            Operator::Sub => {
                if self.operand > *current {
                    Err(StrataError::arithmetic(format!(
                        "{} -= {} underflows below zero",
                        current, self.operand
                    )))
                } else {
                    Ok(current - &self.operand)
                }
            }
            Operator::Mul => Ok(current * &self.operand),
            Operator::Div => {
                if self.operand.is_zero() {
                    Err(StrataError::arithmetic(format!(
                        "{} /= 0 divides by zero",
                        current
                    )))
                } else {
                    Ok(current / &self.operand)
                }
            }
        }
    }
}

/// Decode a stored value as a non-negative integer. Absent keys read as zero.
fn decode_value(bytes: Option<Vec<u8>>) -> BigUint {
    match bytes {
        Some(bytes) => BigUint::from_bytes_be(&bytes),
        None => BigUint::zero(),
    }
}

/// Engine that interprets `key<op>value` arithmetic commands.
pub struct ArithmeticEngine {
    /// Commands applied since init.
    applied: u64,
}

impl ArithmeticEngine {
    /// Create a new arithmetic engine.
    pub fn new() -> Self {
        Self { applied: 0 }
    }
}

impl Default for ArithmeticEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for ArithmeticEngine {
    fn init(&mut self, store: &mut VersionedStore) -> StrataResult<()> {
        tracing::debug!(
            keys = store.len(),
            revision = store.revision(),
            "arithmetic engine bound to store"
        );
        Ok(())
    }

    fn apply(&mut self, store: &mut VersionedStore, message: &Message) -> StrataResult<()> {
        let command = Command::parse(message.payload())?;

        let current = decode_value(store.get(command.variable.as_bytes())?);
        let next = command.evaluate(&current)?;

        store.set(command.variable.clone().into_bytes(), next.to_bytes_be())?;
        self.applied += 1;

        tracing::debug!(
            key = %command.variable,
            operator = %command.operator,
            operand = %command.operand,
            previous = %current,
            result = %next,
            "command applied"
        );
        Ok(())
    }

    fn close(&mut self) -> StrataResult<()> {
        tracing::debug!(applied = self.applied, "arithmetic engine closed");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "arithmetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(payload: &str) -> StrataResult<Command> {
        Command::parse(payload.as_bytes())
    }

    #[test]
    fn parse_set() {
        let c = cmd("x=10").unwrap();
        assert_eq!(c.variable, "x");
        assert_eq!(c.operator, Operator::Set);
        assert_eq!(c.operand, BigUint::from(10u32));
    }

    #[test]
    fn parse_compound_operators() {
        assert_eq!(cmd("x+=5").unwrap().operator, Operator::Add);
        assert_eq!(cmd("x-=5").unwrap().operator, Operator::Sub);
        assert_eq!(cmd("x*=5").unwrap().operator, Operator::Mul);
        assert_eq!(cmd("x/=5").unwrap().operator, Operator::Div);
    }

    #[test]
    fn parse_compound_keeps_key() {
        let c = cmd("counter-=3").unwrap();
        assert_eq!(c.variable, "counter");
        assert_eq!(c.operator, Operator::Sub);
    }

    #[test]
    fn parse_dash_inside_key_is_set() {
        let c = cmd("a-b=3").unwrap();
        assert_eq!(c.variable, "a-b");
        assert_eq!(c.operator, Operator::Set);
    }

    #[test]
    fn parse_empty_key_is_valid() {
        let c = cmd("=5").unwrap();
        assert_eq!(c.variable, "");
        assert_eq!(c.operator, Operator::Set);
    }

    #[test]
    fn parse_full_key_charset() {
        let c = cmd("A_z-09=1").unwrap();
        assert_eq!(c.variable, "A_z-09");
    }

    #[test]
    fn parse_large_operand() {
        let c = cmd("x=340282366920938463463374607431768211456").unwrap();
        assert_eq!(
            c.operand.to_string(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn reject_no_operator() {
        let err = cmd("bad payload no operator").unwrap_err();
        assert!(err.is_command_error());
    }

    #[test]
    fn reject_empty_operand() {
        assert!(cmd("x=").is_err());
        assert!(cmd("x+=").is_err());
    }

    #[test]
    fn reject_signed_operand() {
        assert!(cmd("x=+5").is_err());
        assert!(cmd("x=-5").is_err());
    }

    #[test]
    fn reject_trailing_garbage() {
        assert!(cmd("x=5 ").is_err());
        assert!(cmd("x=5y").is_err());
    }

    #[test]
    fn reject_bad_key_characters() {
        assert!(cmd("a b=1").is_err());
        assert!(cmd("k!=1").is_err());
    }

    #[test]
    fn reject_non_ascii() {
        assert!(Command::parse("é=1".as_bytes()).is_err());
        assert!(Command::parse(&[0xff, b'=', b'1']).is_err());
    }

    #[test]
    fn evaluate_division_truncates() {
        let c = cmd("x/=4").unwrap();
        assert_eq!(c.evaluate(&BigUint::from(10u32)).unwrap(), BigUint::from(2u32));
    }

    #[test]
    fn evaluate_division_by_zero_fails() {
        let c = cmd("x/=0").unwrap();
        let err = c.evaluate(&BigUint::from(10u32)).unwrap_err();
        assert!(matches!(err, StrataError::ArithmeticError { .. }));
    }

    #[test]
    fn evaluate_subtraction_underflow_fails() {
        let c = cmd("x-=11").unwrap();
        let err = c.evaluate(&BigUint::from(10u32)).unwrap_err();
        assert!(matches!(err, StrataError::ArithmeticError { .. }));
    }

    #[test]
    fn evaluate_subtraction_to_zero_is_fine() {
        let c = cmd("x-=10").unwrap();
        assert_eq!(c.evaluate(&BigUint::from(10u32)).unwrap(), BigUint::zero());
    }
}
