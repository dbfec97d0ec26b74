//! Method-style operations on carried values.
//!
//! A carried value finds its definition through its brand: the definition adopted for the
//! brand (by [`build`], unless told otherwise), or, while the brand was never adopted,
//! whichever definition is installed for the current thread.

use crate::*;
use serde::{Deserialize, Serialize};

/// Where the methods of carried values look up their definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dispatch {
    /// the definition [`build`] returns
    #[default]
    Home,
    /// the installed definition, at each call
    Ambient,
}

/// Make `def` the definition every value of `brand` dispatches through.
pub fn adopt(brand: &Brand, def: &Definition) {
    log::trace!("[methods] {} -> {}", brand, def.name());
    brand.adopt(def.as_home());
}

pub trait Carried {
    /// The definition this value's methods dispatch through.
    fn mcontext(&self) -> Result<Definition>;
    fn mbind(&self, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value>;
    fn mapply(&self, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value>;
    fn mjoin(&self) -> Result<Value>;
    fn mpair(&self, other: Value) -> Result<Value>;
    fn mhandle(&self, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value>;
    fn mfinally(&self, f: impl Fn() -> Result<Value> + 'static) -> Result<Value>;
    fn mconst(&self, v: impl Into<Value>) -> Result<Value>;
    fn munshift_to(&self, list: Value) -> Result<Value>;
    fn mplus(&self, other: Value) -> Result<Value>;
    /// `alt` of this value followed by `others`
    fn malt(&self, others: Vec<Value>) -> Result<Value>;
    fn mopt(&self) -> Result<Value>;
    fn munpack(&self) -> Result<Value>;
}

impl Carried for Value {
    fn mcontext(&self) -> Result<Definition> {
        let Value::Carrier(carrier) = self else {
            return Err(Fault::Expected { expected: "a carried effect value", found: self.clone() });
        };
        match carrier.brand.home() {
            | Some(home) => {
                Definition::from_home(&home).ok_or_else(|| Fault::Detached(carrier.brand.name.clone()))
            }
            | None => current().ok_or(Fault::NoAmbient),
        }
    }
    fn mbind(&self, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
        self.mcontext()?.bind(self.clone(), f)
    }
    fn mapply(&self, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
        self.mcontext()?.map(self.clone(), f)
    }
    fn mjoin(&self) -> Result<Value> {
        self.mcontext()?.join(self.clone())
    }
    fn mpair(&self, other: Value) -> Result<Value> {
        self.mcontext()?.pair(self.clone(), other)
    }
    fn mhandle(&self, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
        self.mcontext()?.handle(self.clone(), f)
    }
    fn mfinally(&self, f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
        self.mcontext()?.finally(self.clone(), f)
    }
    fn mconst(&self, v: impl Into<Value>) -> Result<Value> {
        self.mcontext()?.constant(self.clone(), v)
    }
    fn munshift_to(&self, list: Value) -> Result<Value> {
        self.mcontext()?.unshift_to(self.clone(), list)
    }
    fn mplus(&self, other: Value) -> Result<Value> {
        self.mcontext()?.plus(self.clone(), other)
    }
    fn malt(&self, others: Vec<Value>) -> Result<Value> {
        let mut alts = Vec::with_capacity(others.len() + 1);
        alts.push(self.clone());
        alts.extend(others);
        self.mcontext()?.alt(alts)
    }
    fn mopt(&self) -> Result<Value> {
        self.mcontext()?.opt(self.clone())
    }
    fn munpack(&self) -> Result<Value> {
        self.mcontext()?.unpack(self.clone())
    }
}
