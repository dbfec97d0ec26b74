pub mod fmt;
pub use fmt::*;

pub mod err;
pub use err::*;

mod impls;

use derive_more::From;
use mondo_utils::fresh_key_type;
use std::{
    any::Any,
    cell::RefCell,
    rc::{Rc, Weak},
};

/* ---------------------------------- Names --------------------------------- */

/// `Name` of a constructor, without its argument
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CtorName(pub String);

fresh_key_type! {
    /// identity of one dynamic `block` invocation
    pub struct ScopeTag;
    /// identity of one carrier instantiation
    pub struct BrandId;
}

/* ------------------------------- Structural ------------------------------- */

/// `()`, the value that carries no information
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct Triv;

/// `Name(arg)`; concrete effects encode their representations with these
#[derive(Clone, Debug, PartialEq)]
pub struct Ctor(pub CtorName, pub Rc<Value>);

/* -------------------------------- Functions ------------------------------- */

/// A callback receiving one value.
pub type Kont = Rc<dyn Fn(Value) -> Result<Value>>;

/// A function value; two functions are equal only if they are the same allocation.
#[derive(Clone)]
pub struct Func(pub Kont);

/// Behavior a value brings along for operations its definition cannot derive.
pub trait Methods: std::fmt::Debug {
    fn mbind(&self, _f: Kont) -> Result<Value> {
        Err(Fault::MissingMethod { method: "mbind", object: format!("{:?}", self) })
    }
}

#[derive(Clone)]
pub struct Object(pub Rc<dyn Methods>);

/* ---------------------------------- Pulls --------------------------------- */

/// A position in a lazy pull sequence.
///
/// A cursor always stands on an element; pulling yields the cursor standing on the next
/// element, or `None` once the sequence is exhausted.
#[derive(Clone)]
pub struct Cursor {
    pub value: Rc<Value>,
    pub(crate) next: Rc<dyn Fn() -> Option<Cursor>>,
}

/* --------------------------------- Unwind --------------------------------- */

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Tag {
    /// shared by every raised exception
    Exception,
    /// owned by exactly one `block` invocation
    Scope(ScopeTag),
}

/// A pending non-local transfer of control.
#[derive(Clone, Debug, PartialEq)]
pub struct Unwind {
    pub payload: Rc<Value>,
    pub tag: Tag,
}

/* --------------------------------- Carrier -------------------------------- */

#[derive(Clone, Debug)]
pub struct Brand {
    pub id: BrandId,
    pub name: Rc<str>,
    /// the definition carried values dispatch their methods through, held weakly
    pub(crate) home: Rc<RefCell<Option<Weak<dyn Any>>>>,
}

/// An effect value packed by one particular carrier instantiation.
#[derive(Clone, Debug, PartialEq)]
pub struct Carrier {
    pub brand: Brand,
    pub inner: Rc<Value>,
}

/* ---------------------------------- Value --------------------------------- */

#[derive(From, Clone, Debug, PartialEq)]
pub enum Value {
    Triv(Triv),
    Bool(bool),
    Int(i64),
    Str(Rc<str>),
    List(im::Vector<Value>),
    Ctor(Ctor),
    Func(Func),
    Object(Object),
    Cursor(Cursor),
    Unwind(Unwind),
    Carrier(Carrier),
}
