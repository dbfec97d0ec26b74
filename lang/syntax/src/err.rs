use crate::*;
use thiserror::Error;

/// Faults surface as `Err` from operations and callbacks; they live outside the effect,
/// unlike unwind signals which travel inside effect values.
#[derive(Error, Debug, Clone)]
pub enum Fault {
    #[error("`{op}` is not implemented by `{def}`")]
    NotImplemented { op: &'static str, def: Rc<str> },
    #[error("expected {expected}, found `{found}`")]
    Expected { expected: &'static str, found: Value },
    #[error("`{object}` has no method `{method}`")]
    MissingMethod { method: &'static str, object: String },
    #[error("`{expected}` cannot unpack a carrier of `{found}`")]
    ForeignCarrier { expected: Brand, found: Brand },
    #[error("no effect definition is installed in the ambient context")]
    NoAmbient,
    #[error("effect definition `{0}` is no longer alive")]
    Detached(Rc<str>),
    #[error("uncaught exception: {0}")]
    Thrown(Value),
    #[error("escape to a scope that is no longer active: {0}")]
    Escaped(Unwind),
}

pub type Result<T> = std::result::Result<T, Fault>;

impl Fault {
    /// The value a handler sees when this fault is raised into an effect.
    pub fn into_payload(self) -> Value {
        match self {
            | Fault::Thrown(payload) => payload,
            | fault => Value::from(fault.to_string()),
        }
    }
}

/// Fail with a host-level exception carrying `payload`.
pub fn throw<T>(payload: impl Into<Value>) -> Result<T> {
    Err(Fault::Thrown(payload.into()))
}
