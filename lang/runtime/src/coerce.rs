//! Coercing whatever callbacks return into effect values.

use crate::*;
use std::rc::Rc;

/// `f` with its result passed through `coerce`.
fn coerced(coerce: &Op1, f: Kont) -> Kont {
    let coerce = coerce.clone();
    kont(move |v| coerce(f(v)?))
}

pub fn with_coercion(inner: &Definition) -> Built {
    if !inner.supplies(OpName::Coerce) {
        return Err(ConfigError::MissingCoerce { name: inner.name().to_owned() });
    }
    log::trace!("[coerce] {}", inner.name());
    let icoerce = inner.coerce.clone();
    let mut seed = Seed::over(inner, "coerce");
    seed.map = Some(inner.map.clone());

    let (c, ibind) = (icoerce.clone(), inner.bind.clone());
    seed.bind = Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> { ibind(a, coerced(&c, f)) }));
    let (c, ihandle) = (icoerce.clone(), inner.handle.clone());
    seed.handle =
        Some(Rc::new(move |a: Value, f: Kont| -> Result<Value> { ihandle(a, coerced(&c, f)) }));
    let (c, ifinally) = (icoerce.clone(), inner.finally.clone());
    seed.finally = Some(Rc::new(move |a: Value, f: Thunk| -> Result<Value> {
        let c = c.clone();
        ifinally(a, Rc::new(move || c(f()?)))
    }));
    let (c, irepeat) = (icoerce.clone(), inner.repeat.clone());
    seed.repeat =
        Some(Rc::new(move |body: Kont, arg: Value| -> Result<Value> { irepeat(coerced(&c, body), arg) }));
    let (c, ifor_par) = (icoerce.clone(), inner.for_par.clone());
    seed.for_par = Some(Rc::new(move |test: Test, body: Kont, step: Kont, arg: Value| -> Result<Value> {
        ifor_par(test, coerced(&c, body), step, arg)
    }));
    let (c, iblock) = (icoerce.clone(), inner.block.clone());
    seed.block = Some(Rc::new(move |body: Body| -> Result<Value> {
        let c = c.clone();
        iblock(Rc::new(move |escape: Kont| -> Result<Value> { c(body(escape)?) }))
    }));
    let (c, iscope) = (icoerce.clone(), inner.scope.clone());
    seed.scope = Some(Rc::new(move |body: Body| -> Result<Value> {
        let c = c.clone();
        iscope(Rc::new(move |escape: Kont| -> Result<Value> { c(body(escape)?) }))
    }));
    let (c, irun) = (icoerce.clone(), inner.run.clone());
    seed.run = Some(Rc::new(move |f: Thunk| -> Result<Value> {
        let c = c.clone();
        irun(Rc::new(move || c(f()?)))
    }));
    let (c, iseq) = (icoerce.clone(), inner.seq.clone());
    seed.seq = Some(Rc::new(move |source: Source| -> Result<Value> {
        let c = c.clone();
        iseq(Rc::new(move || -> Result<Gen> { Ok(pull::map_yields(source()?, c.clone())) }))
    }));

    seed.complete()
}
