//! Expression evaluator abstraction (spec.md §9 "Expression evaluator as
//! interface abstraction", component C3).
//!
//! The engine depends only on the [`Evaluator`] trait; no concrete
//! expression-language implementation leaks into `engine.rs` or the
//! binding codecs. [`default::DefaultEvaluator`] is Boxon's bundled
//! implementation, grounded in spec.md §6's expression contract rather than
//! in any teacher code, since `original_source/` contributed no files for
//! this spec (see `DESIGN.md`).

pub mod context;
pub mod default;

pub use context::EvalContext;
pub use default::DefaultEvaluator;

use crate::std::{boxed::Box, string::String};
use crate::value::FieldValue;
use crate::Result;

/// A typed value produced by evaluating an expression (spec.md §6 "It
/// returns a typed value").
#[derive(Clone, Debug, PartialEq)]
pub enum EvalValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl EvalValue {
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(crate::Error::codec(format!(
                "expected a boolean expression result, have: {other:?}"
            ))),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Float(v) => Ok(*v as i64),
            other => Err(crate::Error::codec(format!(
                "expected a numeric expression result, have: {other:?}"
            ))),
        }
    }

    pub fn as_u32(&self) -> Result<u32> {
        let v = self.as_i64()?;
        u32::try_from(v).map_err(|_| {
            crate::Error::codec(format!("expression value {v} out of range for a bit count"))
        })
    }
}

impl From<&FieldValue> for EvalValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Signed(v) => Self::Int(*v),
            FieldValue::Unsigned(v) => Self::Int(*v as i64),
            FieldValue::Float(v) => Self::Float(*v as f64),
            FieldValue::Double(v) => Self::Float(*v),
            FieldValue::BigInt(v) => Self::Int(v.to_u64().unwrap_or_default() as i64),
            FieldValue::Str(v) => Self::Str(v.clone()),
            FieldValue::Bool(v) => Self::Bool(*v),
            FieldValue::Bytes(_) | FieldValue::Bitmap(_) | FieldValue::Object(_) => {
                Self::Int(0)
            }
            FieldValue::Array(v) => Self::Int(v.len() as i64),
            FieldValue::None => Self::Bool(false),
        }
    }
}

impl From<&EvalValue> for FieldValue {
    fn from(value: &EvalValue) -> Self {
        match value {
            EvalValue::Int(v) => FieldValue::Signed(*v),
            EvalValue::Float(v) => FieldValue::Double(*v),
            EvalValue::Bool(v) => FieldValue::Bool(*v),
            EvalValue::Str(v) => FieldValue::Str(v.clone()),
        }
    }
}

/// A user-registered function callable from expressions (spec.md §9
/// "register(name, function)").
pub type EvalFn = Box<dyn Fn(&[EvalValue]) -> Result<EvalValue> + Send + Sync>;

/// The evaluator contract (spec.md §9): `eval(expression, context, self?) →
/// typed value`, plus named-function registration.
pub trait Evaluator {
    /// Evaluates `expression` against `context`, returning a typed value.
    /// Implementations MUST reject (with an `Annotation` error) expressions
    /// that cannot be recognized, to satisfy spec.md §4.3's template-build
    /// validation step.
    fn eval(&self, expression: &str, context: &EvalContext) -> Result<EvalValue>;

    /// Validates that `expression` is syntactically acceptable without
    /// evaluating it (spec.md §4.3 step 4: "validating that expression
    /// strings are syntactically acceptable by the evaluator... the
    /// expressions are not evaluated at template-build time").
    fn validate(&self, expression: &str) -> Result<()>;

    /// Registers a named function callable from expressions.
    fn register(&mut self, name: &str, func: EvalFn);
}
