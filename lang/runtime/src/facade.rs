//! Operations of whichever definition is installed for the current thread.

use crate::*;

fn ambient() -> Result<Definition> {
    current().ok_or(Fault::NoAmbient)
}

pub fn pure(v: impl Into<Value>) -> Result<Value> {
    ambient()?.pure(v)
}
pub fn raise(e: impl Into<Value>) -> Result<Value> {
    ambient()?.raise(e)
}
pub fn coerce(v: impl Into<Value>) -> Result<Value> {
    ambient()?.coerce(v)
}
pub fn bind(a: Value, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.bind(a, f)
}
pub fn map(a: Value, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.map(a, f)
}
pub fn join(a: Value) -> Result<Value> {
    ambient()?.join(a)
}
pub fn pair(a: Value, b: Value) -> Result<Value> {
    ambient()?.pair(a, b)
}
pub fn arr(items: Vec<Value>) -> Result<Value> {
    ambient()?.arr(items)
}
pub fn handle(a: Value, f: impl Fn(Value) -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.handle(a, f)
}
pub fn finally(a: Value, f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.finally(a, f)
}
pub fn constant(a: Value, v: impl Into<Value>) -> Result<Value> {
    ambient()?.constant(a, v)
}
pub fn unshift_to(a: Value, list: Value) -> Result<Value> {
    ambient()?.unshift_to(a, list)
}
pub fn alt(alts: Vec<Value>) -> Result<Value> {
    ambient()?.alt(alts)
}
pub fn plus(a: Value, b: Value) -> Result<Value> {
    ambient()?.plus(a, b)
}
pub fn empty() -> Result<Value> {
    ambient()?.empty()
}
pub fn opt(a: Value) -> Result<Value> {
    ambient()?.opt(a)
}
pub fn block(body: impl Fn(Kont) -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.block(body)
}
pub fn scope(body: impl Fn(Kont) -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.scope(body)
}
pub fn repeat(body: impl Fn(Value) -> Result<Value> + 'static, init: impl Into<Value>) -> Result<Value> {
    ambient()?.repeat(body, init)
}
pub fn for_par(
    test: impl Fn(&Value) -> Result<bool> + 'static, body: impl Fn(Value) -> Result<Value> + 'static,
    step: impl Fn(Value) -> Result<Value> + 'static, init: impl Into<Value>,
) -> Result<Value> {
    ambient()?.for_par(test, body, step, init)
}
pub fn seq(source: impl Fn() -> Result<Gen> + 'static) -> Result<Value> {
    ambient()?.seq(source)
}
pub fn run_seq(source: impl Fn() -> Result<Gen> + 'static) -> Result<Value> {
    ambient()?.run_seq(source)
}
pub fn run(f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.run(f)
}
pub fn reify(f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
    ambient()?.reify(f)
}
pub fn reflect(a: Value) -> Result<Value> {
    ambient()?.reflect(a)
}
pub fn pack(v: impl Into<Value>) -> Result<Value> {
    ambient()?.pack(v)
}
pub fn unpack(v: Value) -> Result<Value> {
    ambient()?.unpack(v)
}

/// Run `f` now, turning a fault it returns into a raised exception and coercing anything
/// else into an effect value.
pub fn attempt(f: impl FnOnce() -> Result<Value>) -> Result<Value> {
    let def = ambient()?;
    match f() {
        | Ok(v) => def.coerce(v),
        | Err(fault) => {
            log::trace!("[attempt] raising {}", fault);
            def.raise(fault.into_payload())
        }
    }
}
