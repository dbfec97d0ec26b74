//! Effect definitions.
//!
//! A [`Seed`] is a partial operation table written by hand; [`Seed::complete`] turns it into
//! a [`Definition`], whose table binds every operation. Layers take a definition, start a new
//! seed [`Seed::over`] it, override what they change and complete again.

use crate::*;
use derive_more::Deref;
use std::{
    any::Any,
    fmt,
    rc::{Rc, Weak},
};

/* -------------------------------- Callbacks ------------------------------- */

pub fn kont(f: impl Fn(Value) -> Result<Value> + 'static) -> Kont {
    Rc::new(f)
}

pub type Thunk = Rc<dyn Fn() -> Result<Value>>;
/// The body of a `block`, receiving the escape of that block.
pub type Body = Rc<dyn Fn(Kont) -> Result<Value>>;
pub type Test = Rc<dyn Fn(&Value) -> Result<bool>>;

/// A resumable producer of effect values, driven by `seq`.
///
/// Resuming leaves the generator untouched: it hands back the generator standing after the
/// produced value, so a continuation invoked twice resumes twice from the same position.
pub trait Generator {
    /// Resume with the result of the previous step; `None` once exhausted.
    fn resume(&self, input: Value) -> Result<Option<(Value, Gen)>>;
}

pub type Gen = Rc<dyn Generator>;
/// Starts a fresh generator.
pub type Source = Rc<dyn Fn() -> Result<Gen>>;

/* ------------------------------- Operations ------------------------------- */

pub type Op0 = Rc<dyn Fn() -> Result<Value>>;
pub type Op1 = Rc<dyn Fn(Value) -> Result<Value>>;
pub type Op2 = Rc<dyn Fn(Value, Value) -> Result<Value>>;
pub type OpList = Rc<dyn Fn(Vec<Value>) -> Result<Value>>;
pub type OpKont = Rc<dyn Fn(Value, Kont) -> Result<Value>>;
pub type OpFinally = Rc<dyn Fn(Value, Thunk) -> Result<Value>>;
pub type OpBlock = Rc<dyn Fn(Body) -> Result<Value>>;
pub type OpRepeat = Rc<dyn Fn(Kont, Value) -> Result<Value>>;
pub type OpForPar = Rc<dyn Fn(Test, Kont, Kont, Value) -> Result<Value>>;
pub type OpSeq = Rc<dyn Fn(Source) -> Result<Value>>;
pub type OpRun = Rc<dyn Fn(Thunk) -> Result<Value>>;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum OpName {
    Pure,
    Raise,
    Coerce,
    Bind,
    Map,
    Join,
    Pair,
    Arr,
    Handle,
    Finally,
    Const,
    UnshiftTo,
    Alt,
    Plus,
    Empty,
    Opt,
    Block,
    Scope,
    Repeat,
    ForPar,
    Seq,
    Run,
    Reify,
    Reflect,
    Pack,
    Unpack,
}

impl OpName {
    /// The name callers dispatch on.
    pub fn as_str(self) -> &'static str {
        match self {
            | OpName::Pure => "pure",
            | OpName::Raise => "raise",
            | OpName::Coerce => "coerce",
            | OpName::Bind => "bind",
            | OpName::Map => "map",
            | OpName::Join => "join",
            | OpName::Pair => "pair",
            | OpName::Arr => "arr",
            | OpName::Handle => "handle",
            | OpName::Finally => "finally",
            | OpName::Const => "const",
            | OpName::UnshiftTo => "unshiftTo",
            | OpName::Alt => "alt",
            | OpName::Plus => "plus",
            | OpName::Empty => "empty",
            | OpName::Opt => "opt",
            | OpName::Block => "block",
            | OpName::Scope => "scope",
            | OpName::Repeat => "repeat",
            | OpName::ForPar => "forPar",
            | OpName::Seq => "seq",
            | OpName::Run => "run",
            | OpName::Reify => "reify",
            | OpName::Reflect => "reflect",
            | OpName::Pack => "pack",
            | OpName::Unpack => "unpack",
        }
    }
}

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fault of an operation nobody provided.
pub(crate) fn missing(def: &Rc<str>, op: OpName) -> Fault {
    Fault::NotImplemented { op: op.as_str(), def: def.clone() }
}

/* --------------------------------- Tables --------------------------------- */

macro_rules! tables {
    ($($op:ident : $ty:ident = $name:ident),* $(,)?) => {
        /// A partial operation table; only `pure` is mandatory.
        #[derive(Clone, Default)]
        pub struct Seed {
            pub(crate) name: Option<Rc<str>>,
            pub(crate) base: Option<Definition>,
            /// set by the context layer on its own seed
            pub(crate) context: Option<ContextMode>,
            /// set by the carrier layer on its own seed
            pub(crate) brand: Option<Brand>,
            pub(crate) reanchor: Option<Reanchor>,
            $( pub(crate) $op: Option<$ty>, )*
        }

        /// A complete operation table.
        pub struct Table {
            pub(crate) name: Rc<str>,
            pub(crate) base: Option<Definition>,
            /// the mode, if this table is a context layer
            pub(crate) context: Option<ContextMode>,
            /// the brand, if this table is a carrier layer
            pub(crate) brand: Option<Brand>,
            /// operations given at this level rather than derived
            pub(crate) supplied: im::OrdSet<OpName>,
            $( pub(crate) $op: $ty, )*
        }

        impl Seed {
            /// Operations present in this seed.
            pub fn supplied(&self) -> im::OrdSet<OpName> {
                let mut set = im::OrdSet::new();
                $( if self.$op.is_some() { set.insert(OpName::$name); } )*
                set
            }
        }

        impl Definition {
            /// A seed keeping every operation this definition supplied itself, to be
            /// overridden further and completed again.
            ///
            /// A context layer stays on top: the seed extends the definition beneath it, and
            /// completing it installs the context again.
            pub fn extend(&self, layer: &str) -> Seed {
                if let Some(seed) = self.beneath_context(layer) {
                    return seed;
                }
                Seed {
                    $( $op: self.supplied.contains(&OpName::$name).then(|| self.$op.clone()), )*
                    ..Seed::atop(self, layer)
                }
            }
        }
    };
}

tables! {
    pure: Op1 = Pure,
    raise: Op1 = Raise,
    coerce: Op1 = Coerce,
    bind: OpKont = Bind,
    map: OpKont = Map,
    join: Op1 = Join,
    pair: Op2 = Pair,
    arr: OpList = Arr,
    handle: OpKont = Handle,
    finally: OpFinally = Finally,
    constant: Op2 = Const,
    unshift_to: Op2 = UnshiftTo,
    alt: OpList = Alt,
    plus: Op2 = Plus,
    empty: Op0 = Empty,
    opt: Op1 = Opt,
    block: OpBlock = Block,
    scope: OpBlock = Scope,
    repeat: OpRepeat = Repeat,
    for_par: OpForPar = ForPar,
    seq: OpSeq = Seq,
    run: OpRun = Run,
    reify: OpRun = Reify,
    reflect: Op1 = Reflect,
    pack: Op1 = Pack,
    unpack: Op1 = Unpack,
}

/// How [`Seed::complete`] puts a context layer back on top of an extended definition.
#[derive(Clone)]
pub(crate) struct Reanchor {
    pub(crate) mode: ContextMode,
    /// a brand to adopt the result, since it adopted the extended definition
    pub(crate) brand: Option<Brand>,
}

impl Definition {
    fn beneath_context(&self, layer: &str) -> Option<Seed> {
        let (mode, base) = (self.context?, self.base.as_ref()?);
        log::trace!("[extend] {} beneath its context", self.name);
        let brand = self.brand().filter(|brand| {
            let home = brand.home();
            home.as_ref().and_then(Definition::from_home).is_some_and(|home| home.ptr_eq(self))
        });
        Some(Seed { reanchor: Some(Reanchor { mode, brand: brand.cloned() }), ..base.extend(layer) })
    }
}

/* ---------------------------------- Seed ---------------------------------- */

macro_rules! setters {
    ($( $(#[$doc:meta])* $op:ident ( $($arg:ty),* ); )*) => {
        impl Seed {
            $(
                $(#[$doc])*
                pub fn $op(mut self, f: impl Fn($($arg),*) -> Result<Value> + 'static) -> Self {
                    self.$op = Some(Rc::new(f));
                    self
                }
            )*
        }
    };
}

setters! {
    /// `pure(v)`: lift a plain value
    pure(Value);
    /// `raise(e)`: an effect value representing the exception `e`
    raise(Value);
    /// `coerce(v)`: promote an arbitrary value into an effect value
    coerce(Value);
    bind(Value, Kont);
    /// `map(a, f)`: the callback returns a plain value
    map(Value, Kont);
    join(Value);
    pair(Value, Value);
    arr(Vec<Value>);
    /// `handle(a, f)`: the callback receives the exception payload
    handle(Value, Kont);
    finally(Value, Thunk);
    constant(Value, Value);
    unshift_to(Value, Value);
    alt(Vec<Value>);
    plus(Value, Value);
    empty();
    opt(Value);
    block(Body);
    scope(Body);
    repeat(Kont, Value);
    for_par(Test, Kont, Kont, Value);
    seq(Source);
    run(Thunk);
    reify(Thunk);
    reflect(Value);
    pack(Value);
    unpack(Value);
}

impl Seed {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Seed { name: Some(name.into()), ..Seed::default() }
    }

    /// An empty seed for a layer on top of `inner`.
    pub(crate) fn atop(inner: &Definition, layer: &str) -> Self {
        Seed {
            name: Some(format!("{}+{}", inner.name, layer).into()),
            base: Some(inner.clone()),
            ..Seed::default()
        }
    }

    /// A seed for a layer on top of `inner` that keeps the value representation: the
    /// constructors and alternatives `inner` supplied itself carry over, everything else
    /// is overridden by the layer or derived again from the new table.
    pub(crate) fn over(inner: &Definition, layer: &str) -> Self {
        let keep = |op: OpName| inner.supplies(op);
        Seed {
            pure: Some(inner.pure.clone()),
            coerce: keep(OpName::Coerce).then(|| inner.coerce.clone()),
            raise: keep(OpName::Raise).then(|| inner.raise.clone()),
            arr: keep(OpName::Arr).then(|| inner.arr.clone()),
            alt: keep(OpName::Alt).then(|| inner.alt.clone()),
            plus: keep(OpName::Plus).then(|| inner.plus.clone()),
            empty: keep(OpName::Empty).then(|| inner.empty.clone()),
            opt: keep(OpName::Opt).then(|| inner.opt.clone()),
            pack: keep(OpName::Pack).then(|| inner.pack.clone()),
            unpack: keep(OpName::Unpack).then(|| inner.unpack.clone()),
            ..Seed::atop(inner, layer)
        }
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("name", &self.name)
            .field("supplied", &self.supplied().iter().map(|op| op.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

/* ------------------------------- Definition ------------------------------- */

/// A complete effect definition; cloning shares the table.
#[derive(Clone, Deref)]
pub struct Definition(Rc<Table>);

impl Definition {
    pub(crate) fn new(table: Table) -> Self {
        Definition(Rc::new(table))
    }
    pub(crate) fn downgrade(&self) -> Weak<Table> {
        Rc::downgrade(&self.0)
    }
    pub(crate) fn upgrade(weak: &Weak<Table>) -> Option<Self> {
        weak.upgrade().map(Definition)
    }
    /// This definition as the home of a brand.
    pub(crate) fn as_home(&self) -> Weak<dyn Any> {
        self.downgrade()
    }
    /// `None` once the home is dropped, or if it never was a definition.
    pub(crate) fn from_home(home: &Weak<dyn Any>) -> Option<Self> {
        home.upgrade()?.downcast::<Table>().ok().map(Definition)
    }
    /// Whether both handles share one table.
    pub fn ptr_eq(&self, other: &Definition) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("supplied", &self.supplied.iter().map(|op| op.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The definition this one was layered on, if any.
    pub fn base(&self) -> Option<&Definition> {
        self.base.as_ref()
    }
    /// The brand of the nearest carrier layer at or beneath this one.
    pub fn brand(&self) -> Option<&Brand> {
        self.brand.as_ref().or_else(|| self.base.as_ref()?.brand())
    }
    /// Whether `op` was given at this level rather than derived.
    pub fn supplies(&self, op: OpName) -> bool {
        self.supplied.contains(&op)
    }

    pub fn pure(&self, v: impl Into<Value>) -> Result<Value> {
        (self.pure)(v.into())
    }
    pub fn raise(&self, e: impl Into<Value>) -> Result<Value> {
        (self.raise)(e.into())
    }
    pub fn coerce(&self, v: impl Into<Value>) -> Result<Value> {
        (self.coerce)(v.into())
    }
    pub fn bind(&self, a: Value, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
        (self.bind)(a, Rc::new(f))
    }
    pub fn map(&self, a: Value, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
        (self.map)(a, Rc::new(f))
    }
    pub fn join(&self, a: Value) -> Result<Value> {
        (self.join)(a)
    }
    pub fn pair(&self, a: Value, b: Value) -> Result<Value> {
        (self.pair)(a, b)
    }
    pub fn arr(&self, items: Vec<Value>) -> Result<Value> {
        (self.arr)(items)
    }
    pub fn handle(&self, a: Value, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
        (self.handle)(a, Rc::new(f))
    }
    pub fn finally(&self, a: Value, f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
        (self.finally)(a, Rc::new(f))
    }
    /// `const(a, v)`
    pub fn constant(&self, a: Value, v: impl Into<Value>) -> Result<Value> {
        (self.constant)(a, v.into())
    }
    pub fn unshift_to(&self, a: Value, list: Value) -> Result<Value> {
        (self.unshift_to)(a, list)
    }
    pub fn alt(&self, alts: Vec<Value>) -> Result<Value> {
        (self.alt)(alts)
    }
    pub fn plus(&self, a: Value, b: Value) -> Result<Value> {
        (self.plus)(a, b)
    }
    pub fn empty(&self) -> Result<Value> {
        (self.empty)()
    }
    pub fn opt(&self, a: Value) -> Result<Value> {
        (self.opt)(a)
    }
    pub fn block(&self, body: impl Fn(Kont) -> Result<Value> + 'static) -> Result<Value> {
        (self.block)(Rc::new(body))
    }
    pub fn scope(&self, body: impl Fn(Kont) -> Result<Value> + 'static) -> Result<Value> {
        (self.scope)(Rc::new(body))
    }
    pub fn repeat(
        &self, body: impl Fn(Value) -> Result<Value> + 'static, init: impl Into<Value>,
    ) -> Result<Value> {
        (self.repeat)(Rc::new(body), init.into())
    }
    pub fn for_par(
        &self, test: impl Fn(&Value) -> Result<bool> + 'static,
        body: impl Fn(Value) -> Result<Value> + 'static,
        step: impl Fn(Value) -> Result<Value> + 'static, init: impl Into<Value>,
    ) -> Result<Value> {
        (self.for_par)(Rc::new(test), Rc::new(body), Rc::new(step), init.into())
    }
    pub fn seq(&self, source: impl Fn() -> Result<Gen> + 'static) -> Result<Value> {
        (self.seq)(Rc::new(source))
    }
    /// `run(() => seq(source))`
    pub fn run_seq(&self, source: impl Fn() -> Result<Gen> + 'static) -> Result<Value> {
        let (seq, source): (OpSeq, Source) = (self.seq.clone(), Rc::new(source));
        (self.run)(Rc::new(move || seq(source.clone())))
    }
    pub fn run(&self, f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
        (self.run)(Rc::new(f))
    }
    pub fn reify(&self, f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
        (self.reify)(Rc::new(f))
    }
    pub fn reflect(&self, a: Value) -> Result<Value> {
        (self.reflect)(a)
    }
    pub fn pack(&self, v: impl Into<Value>) -> Result<Value> {
        (self.pack)(v.into())
    }
    pub fn unpack(&self, v: Value) -> Result<Value> {
        (self.unpack)(v)
    }
}
