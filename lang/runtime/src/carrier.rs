//! Wrapping every effect value of a definition in a [`Carrier`] of one brand.
//!
//! Operations unpack their arguments before delegating to the wrapped definition and pack
//! what it produces, so values of two instantiations never mix silently.

use crate::*;
use std::rc::Rc;

struct Wrapper {
    brand: Brand,
    /// `coerce` of the wrapped definition, if it supplied one
    coerce: Option<Op1>,
}

impl Wrapper {
    fn pack(&self, v: Value) -> Value {
        Carrier::new(&self.brand, v).into()
    }
    fn coerce(&self, icoerce: &Op1, v: Value) -> Result<Value> {
        match v {
            | Value::Carrier(carrier) if carrier.brand == self.brand => Ok(carrier.into()),
            | v => Ok(self.pack(icoerce(v)?)),
        }
    }
    fn unpack(&self, v: Value) -> Result<Value> {
        match (&self.coerce, v) {
            | (_, Value::Carrier(carrier)) if carrier.brand == self.brand => Ok(carrier.inner()),
            | (Some(icoerce), v) => icoerce(v),
            | (None, Value::Carrier(carrier)) => {
                Err(Fault::ForeignCarrier { expected: self.brand.clone(), found: carrier.brand })
            }
            | (None, found) => Err(Fault::Expected { expected: "a carried effect value", found }),
        }
    }
    fn unpack_all(&self, items: Vec<Value>) -> Result<Vec<Value>> {
        items.into_iter().map(|v| self.unpack(v)).collect()
    }
    /// `f` with its result unpacked.
    fn inward(self: &Rc<Self>, f: Kont) -> Kont {
        let w = self.clone();
        kont(move |v| w.unpack(f(v)?))
    }
}

pub fn with_carrier(inner: &Definition, brand: Brand) -> Built {
    log::trace!("[carrier] {} as {}", inner.name(), brand);
    let coerce = inner.supplies(OpName::Coerce).then(|| inner.coerce.clone());
    let w = Rc::new(Wrapper { brand, coerce });
    let mut seed = Seed::atop(inner, "carrier");
    seed.brand = Some(w.brand.clone());

    if let Some(icoerce) = w.coerce.clone() {
        let w = w.clone();
        seed.coerce = Some(Rc::new(move |v: Value| -> Result<Value> { w.coerce(&icoerce, v) }));
    }
    let w_ = w.clone();
    seed.unpack = Some(Rc::new(move |v: Value| -> Result<Value> { w_.unpack(v) }));
    let w_ = w.clone();
    seed.pack = Some(Rc::new(move |v: Value| -> Result<Value> { Ok(w_.pack(v)) }));

    /* ---------------------------------- Monad --------------------------------- */

    let (w_, ipure) = (w.clone(), inner.pure.clone());
    seed.pure = Some(Rc::new(move |v: Value| -> Result<Value> { Ok(w_.pack(ipure(v)?)) }));
    let (w_, imap) = (w.clone(), inner.map.clone());
    seed.map = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> {
        Ok(w_.pack(imap(w_.unpack(a)?, f)?))
    }));
    let (w_, ibind) = (w.clone(), inner.bind.clone());
    seed.bind = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> {
        Ok(w_.pack(ibind(w_.unpack(a)?, w_.inward(f))?))
    }));
    let (w_, ipair) = (w.clone(), inner.pair.clone());
    seed.pair = Some(Rc::new(move |a: Value, b: Value| -> Result<Value> {
        Ok(w_.pack(ipair(w_.unpack(a)?, w_.unpack(b)?)?))
    }));
    let (w_, iarr) = (w.clone(), inner.arr.clone());
    seed.arr = Some(Rc::new(move |items: Vec<Value>| -> Result<Value> {
        Ok(w_.pack(iarr(w_.unpack_all(items)?)?))
    }));

    /* --------------------------------- Control -------------------------------- */

    let (w_, iraise) = (w.clone(), inner.raise.clone());
    seed.raise = Some(Rc::new(move |e: Value| -> Result<Value> { Ok(w_.pack(iraise(e)?)) }));
    let (w_, ihandle) = (w.clone(), inner.handle.clone());
    seed.handle = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> {
        Ok(w_.pack(ihandle(w_.unpack(a)?, w_.inward(f))?))
    }));
    let (w_, ifinally) = (w.clone(), inner.finally.clone());
    seed.finally = Some(Rc::new(move |a: Value, f: Thunk| -> Result<Value> {
        let w = w_.clone();
        let cleanup: Thunk = Rc::new(move || w.unpack(f()?));
        Ok(w_.pack(ifinally(w_.unpack(a)?, cleanup)?))
    }));
    let (w_, iblock) = (w.clone(), inner.block.clone());
    seed.block = Some(Rc::new(move |body: Body| -> Result<Value> {
        Ok(w_.pack(iblock(w_.delimit(body))?))
    }));
    let (w_, iscope) = (w.clone(), inner.scope.clone());
    seed.scope = Some(Rc::new(move |body: Body| -> Result<Value> {
        Ok(w_.pack(iscope(w_.delimit(body))?))
    }));

    /* ---------------------------------- Loops --------------------------------- */

    let (w_, irepeat) = (w.clone(), inner.repeat.clone());
    seed.repeat = Some(Rc::new(move |body: Kont, arg: Value| -> Result<Value> {
        Ok(w_.pack(irepeat(w_.inward(body), arg)?))
    }));
    let (w_, ifor_par) = (w.clone(), inner.for_par.clone());
    seed.for_par = Some(Rc::new(move |test: Test, body: Kont, step: Kont, arg: Value| -> Result<Value> {
        Ok(w_.pack(ifor_par(test, w_.inward(body), step, arg)?))
    }));

    /* ------------------------------ Alternatives ------------------------------ */

    let (w_, iplus) = (w.clone(), inner.plus.clone());
    seed.plus = Some(Rc::new(move |a: Value, b: Value| -> Result<Value> {
        Ok(w_.pack(iplus(w_.unpack(a)?, w_.unpack(b)?)?))
    }));
    let (w_, iempty) = (w.clone(), inner.empty.clone());
    seed.empty = Some(Rc::new(move || -> Result<Value> { Ok(w_.pack(iempty()?)) }));
    let (w_, ialt) = (w.clone(), inner.alt.clone());
    seed.alt = Some(Rc::new(move |alts: Vec<Value>| -> Result<Value> {
        Ok(w_.pack(ialt(w_.unpack_all(alts)?)?))
    }));

    /* ---------------------------------- Runs ---------------------------------- */

    let (w_, irun) = (w.clone(), inner.run.clone());
    seed.run = Some(Rc::new(move |f: Thunk| -> Result<Value> {
        let w = w_.clone();
        irun(Rc::new(move || w.unpack(f()?)))
    }));
    let (w_, ireify) = (w.clone(), inner.reify.clone());
    seed.reify = Some(Rc::new(move |f: Thunk| -> Result<Value> { w_.unpack(ireify(f)?) }));
    let (w_, ireflect) = (w.clone(), inner.reflect.clone());
    seed.reflect = Some(Rc::new(move |a: Value| -> Result<Value> { Ok(w_.pack(ireflect(a)?)) }));

    seed.complete()
}

impl Wrapper {
    /// A block body for the wrapped definition; the escape it hands out packs its result.
    fn delimit(self: &Rc<Self>, body: Body) -> Body {
        let w = self.clone();
        Rc::new(move |escape: Kont| -> Result<Value> {
            let w_ = w.clone();
            let escape = kont(move |v| Ok(w_.pack(escape(v)?)));
            w.unpack(body(escape)?)
        })
    }
}
