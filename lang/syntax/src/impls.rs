use crate::*;
use std::fmt;

/* ---------------------------------- Names --------------------------------- */

impl<T: AsRef<str>> From<T> for CtorName {
    fn from(name: T) -> Self {
        CtorName(name.as_ref().to_string())
    }
}

impl fmt::Display for CtorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/* -------------------------------- Functions ------------------------------- */

impl Func {
    pub fn new(f: impl Fn(Value) -> Result<Value> + 'static) -> Self {
        Func(Rc::new(f))
    }
    pub fn call(&self, arg: Value) -> Result<Value> {
        (self.0)(arg)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Func({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Object {
    pub fn new(methods: impl Methods + 'static) -> Self {
        Object(Rc::new(methods))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

/* ---------------------------------- Pulls --------------------------------- */

impl Cursor {
    pub fn new(value: Value, next: impl Fn() -> Option<Cursor> + 'static) -> Self {
        Cursor { value: Rc::new(value), next: Rc::new(next) }
    }
    pub fn value(&self) -> Value {
        self.value.as_ref().clone()
    }
    /// The cursor standing on the next element, if any.
    pub fn pull(&self) -> Option<Cursor> {
        (self.next)()
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("value", &self.value).finish_non_exhaustive()
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && std::ptr::addr_eq(Rc::as_ptr(&self.next), Rc::as_ptr(&other.next))
    }
}

/* --------------------------------- Unwind --------------------------------- */

impl Unwind {
    pub fn exception(payload: Value) -> Self {
        Unwind { payload: Rc::new(payload), tag: Tag::Exception }
    }
    pub fn scope(payload: Value, tag: ScopeTag) -> Self {
        Unwind { payload: Rc::new(payload), tag: Tag::Scope(tag) }
    }
    pub fn payload(&self) -> Value {
        self.payload.as_ref().clone()
    }
    pub fn is_exception(&self) -> bool {
        self.tag == Tag::Exception
    }
}

/* --------------------------------- Carrier -------------------------------- */

impl Brand {
    pub fn fresh(name: impl Into<Rc<str>>) -> Self {
        Brand { id: BrandId::fresh(), name: name.into(), home: Rc::default() }
    }
    /// Make `home` the definition every value of this brand dispatches through, replacing
    /// any earlier one; clones of the brand share it.
    pub fn adopt(&self, home: Weak<dyn Any>) {
        *self.home.borrow_mut() = Some(home);
    }
    /// `None` while the brand was never adopted.
    pub fn home(&self) -> Option<Weak<dyn Any>> {
        self.home.borrow().clone()
    }
}

impl PartialEq for Brand {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Brand {}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.id.concise())
    }
}

impl Carrier {
    pub fn new(brand: &Brand, inner: Value) -> Self {
        Carrier { brand: brand.clone(), inner: Rc::new(inner) }
    }
    pub fn inner(&self) -> Value {
        self.inner.as_ref().clone()
    }
}

/* ---------------------------------- Value --------------------------------- */

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Triv(Triv)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into_iter().collect())
    }
}

/// An exhausted sequence is `()`.
impl From<Option<Cursor>> for Value {
    fn from(cursor: Option<Cursor>) -> Self {
        match cursor {
            | Some(cursor) => Value::Cursor(cursor),
            | None => Value::Triv(Triv),
        }
    }
}

impl Value {
    pub fn ctor(name: impl Into<CtorName>, arg: impl Into<Value>) -> Self {
        Ctor(name.into(), Rc::new(arg.into())).into()
    }
    pub fn func(f: impl Fn(Value) -> Result<Value> + 'static) -> Self {
        Func::new(f).into()
    }
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn is_triv(&self) -> bool {
        matches!(self, Value::Triv(Triv))
    }
    pub fn is_unwind(&self) -> bool {
        matches!(self, Value::Unwind(_))
    }
    pub fn as_unwind(&self) -> Option<&Unwind> {
        match self {
            | Value::Unwind(unwind) => Some(unwind),
            | _ => None,
        }
    }
    /// The payload, if this is a constructor named `name`.
    pub fn as_ctor(&self, name: &str) -> Option<&Value> {
        match self {
            | Value::Ctor(Ctor(CtorName(n), arg)) if n == name => Some(arg.as_ref()),
            | _ => None,
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            | Value::Int(i) => Ok(*i),
            | found => Err(Fault::Expected { expected: "an integer", found: found.clone() }),
        }
    }
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            | Value::Bool(b) => Ok(*b),
            | found => Err(Fault::Expected { expected: "a boolean", found: found.clone() }),
        }
    }
    pub fn as_str(&self) -> Result<&str> {
        match self {
            | Value::Str(s) => Ok(&**s),
            | found => Err(Fault::Expected { expected: "a string", found: found.clone() }),
        }
    }
    pub fn into_list(self) -> Result<im::Vector<Value>> {
        match self {
            | Value::List(items) => Ok(items),
            | found => Err(Fault::Expected { expected: "a list", found }),
        }
    }
    /// Either a cursor or `()` for an exhausted sequence.
    pub fn into_cursor(self) -> Result<Option<Cursor>> {
        match self {
            | Value::Cursor(cursor) => Ok(Some(cursor)),
            | Value::Triv(Triv) => Ok(None),
            | found => Err(Fault::Expected { expected: "a cursor", found }),
        }
    }
    pub fn call(&self, arg: Value) -> Result<Value> {
        match self {
            | Value::Func(f) => f.call(arg),
            | found => Err(Fault::Expected { expected: "a function", found: found.clone() }),
        }
    }
}
