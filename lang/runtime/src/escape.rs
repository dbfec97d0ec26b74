//! Exceptions and delimited escapes.
//!
//! A definition whose base can handle exceptions natively gets `block` on top of its own
//! `raise` and `handle`. Any other definition threads [`Unwind`] signals through its
//! results instead: continuations are skipped while a signal is the current value.

use crate::*;
use std::rc::Rc;

pub fn with_escape_control(inner: &Definition) -> Built {
    let seed = Seed::over(inner, "escape");
    let seed = if inner.supplies(OpName::Handle) {
        log::trace!("[escape] {} handles natively", inner.name());
        native(inner, seed)
    } else {
        log::trace!("[escape] {} threads tokens", inner.name());
        token(inner, seed)
    };
    seed.complete()
}

/// Turn a signal left at the top level into a fault.
pub fn settle(v: Value) -> Result<Value> {
    match v {
        | Value::Unwind(unwind) if unwind.is_exception() => Err(Fault::Thrown(unwind.payload())),
        | Value::Unwind(unwind) => Err(Fault::Escaped(unwind)),
        | v => Ok(v),
    }
}

/// The payload of `v` if it is a signal with `tag`.
fn caught(v: &Value, tag: Tag) -> Option<Value> {
    v.as_unwind().filter(|unwind| unwind.tag == tag).map(Unwind::payload)
}

fn allocate() -> ScopeTag {
    let tag = ScopeTag::fresh();
    log::trace!("[escape] block {}", tag.concise());
    tag
}

/* --------------------------------- Native --------------------------------- */

fn native(inner: &Definition, mut seed: Seed) -> Seed {
    seed.bind = Some(inner.bind.clone());
    seed.map = Some(inner.map.clone());
    seed.raise = Some(inner.raise.clone());
    seed.repeat = Some(inner.repeat.clone());
    seed.for_par = Some(inner.for_par.clone());
    seed.finally = Some(inner.finally.clone());

    let (iraise, ihandle) = (inner.raise.clone(), inner.handle.clone());
    seed.handle = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> {
        let iraise = iraise.clone();
        ihandle(a, kont(move |v| if v.is_unwind() { iraise(v) } else { f(v) }))
    }));

    let (ipure, iraise, ihandle) = (inner.pure.clone(), inner.raise.clone(), inner.handle.clone());
    let block: OpBlock = Rc::new(move |body: Body| -> Result<Value> {
        let tag = Tag::Scope(allocate());
        let escape = {
            let iraise = iraise.clone();
            kont(move |v| iraise(Unwind { payload: Rc::new(v), tag }.into()))
        };
        let result = body(escape)?;
        let (ipure, iraise) = (ipure.clone(), iraise.clone());
        ihandle(
            result,
            kont(move |v| match caught(&v, tag) {
                | Some(payload) => ipure(payload),
                | None => iraise(v),
            }),
        )
    });
    seed.block = Some(block.clone());
    seed.scope = Some(block);
    seed
}

/* ---------------------------------- Token --------------------------------- */

fn token(inner: &Definition, mut seed: Seed) -> Seed {
    let imap = inner.map.clone();
    seed.map = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> {
        imap(a, kont(move |v| if v.is_unwind() { Ok(v) } else { f(v) }))
    }));

    let (ibind, ipure) = (inner.bind.clone(), inner.pure.clone());
    seed.bind = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> {
        let ipure = ipure.clone();
        ibind(a, kont(move |v| if v.is_unwind() { ipure(v) } else { f(v) }))
    }));

    let ipure = inner.pure.clone();
    seed.raise = Some(Rc::new(move |e: Value| -> Result<Value> {
        ipure(Unwind::exception(e).into())
    }));

    let (ibind, ipure) = (inner.bind.clone(), inner.pure.clone());
    seed.handle = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> {
        let ipure = ipure.clone();
        ibind(
            a,
            kont(move |v| match caught(&v, Tag::Exception) {
                | Some(payload) => f(payload),
                | None => ipure(v),
            }),
        )
    }));

    // the outcome of the cleanup supersedes the original one only if it is a signal
    let (ibind, imap) = (inner.bind.clone(), inner.map.clone());
    seed.finally = Some(Rc::new(move |a: Value, f: Thunk| -> Result<Value> {
        let imap = imap.clone();
        ibind(
            a,
            kont(move |v1| {
                imap(f()?, kont(move |v2| Ok(if v2.is_unwind() { v2 } else { v1.clone() })))
            }),
        )
    }));

    let (ibind, ipure) = (inner.bind.clone(), inner.pure.clone());
    let block: OpBlock = Rc::new(move |body: Body| -> Result<Value> {
        let tag = Tag::Scope(allocate());
        let escape = {
            let ipure = ipure.clone();
            kont(move |v| ipure(Unwind { payload: Rc::new(v), tag }.into()))
        };
        let result = body(escape)?;
        let ipure = ipure.clone();
        ibind(
            result,
            kont(move |v| match caught(&v, tag) {
                | Some(payload) => ipure(payload),
                | None => ipure(v),
            }),
        )
    });
    seed.block = Some(block.clone());
    seed.scope = Some(block);
    seed
}
