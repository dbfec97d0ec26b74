//! The definition installed for the current thread.
//!
//! Code written against [`crate::facade`] finds its definition here. A definition with the
//! context layer installs itself around every callback it invokes, so callbacks see the
//! definition that called them even when other definitions ran in between.

use crate::*;
use mondo_utils::{prelude::*, slot};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

thread_local! {
    static AMBIENT: RefCell<Option<Definition>> = const { RefCell::new(None) };
}

pub fn current() -> Option<Definition> {
    slot::peek(&AMBIENT)
}

/// Install `def` and return the definition it replaces.
pub fn set_current(def: Option<Definition>) -> Option<Definition> {
    slot::swap(&AMBIENT, def)
}

/// Run `f` with `def` installed; the former definition is back in place afterwards.
pub fn with_context<T>(def: &Definition, f: impl FnOnce() -> T) -> T {
    let _restore = Restore::replace(&AMBIENT, Some(def.clone()));
    f()
}

/// `f` running with `def` installed whenever it is called.
pub fn lift(def: &Definition, f: impl Fn(Value) -> Result<Value> + 'static) -> Kont {
    let def = def.clone();
    kont(move |v| with_context(&def, || f(v)))
}

impl Definition {
    /// `run(f)` with this definition installed.
    pub fn execute(&self, f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
        with_context(self, || self.run(f))
    }
}

/* ---------------------------------- Layer --------------------------------- */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextMode {
    Off,
    /// only `run` installs the definition
    RunOnly,
    #[default]
    Full,
}

/// The definition a layer installs, known only once the layer is complete.
#[derive(Clone)]
struct Anchor {
    name: Rc<str>,
    cell: Rc<OnceCell<Weak<Table>>>,
}

impl Anchor {
    fn enter<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let def = self.cell.get().and_then(Definition::upgrade);
        let def = def.ok_or_else(|| Fault::Detached(self.name.clone()))?;
        with_context(&def, f)
    }
    fn lift(&self, f: Kont) -> Kont {
        let anchor = self.clone();
        kont(move |v| anchor.enter(|| f(v)))
    }
    /// Every resumption of `generator`, and of the generators it hands back, run inside.
    fn entered(&self, generator: Gen) -> Gen {
        let anchor = self.clone();
        Rc::new(move |input: Value| -> Result<Option<(Value, Gen)>> {
            let step = anchor.enter(|| generator.resume(input))?;
            Ok(step.map(|(produced, next)| (produced, anchor.entered(next))))
        })
    }
    fn lift_thunk(&self, f: Thunk) -> Thunk {
        let anchor = self.clone();
        Rc::new(move || anchor.enter(|| f()))
    }
    fn lift_body(&self, body: Body) -> Body {
        let anchor = self.clone();
        Rc::new(move |escape: Kont| anchor.enter(|| body(escape)))
    }
}

pub fn with_ambient_context(inner: &Definition, mode: ContextMode) -> Built {
    if mode == ContextMode::Off {
        return Ok(inner.clone());
    }
    log::trace!("[context] {} ({:?})", inner.name(), mode);
    let mut seed = Seed::over(inner, "context");
    seed.context = Some(mode);
    let anchor = Anchor {
        name: format!("{}+context", inner.name()).into(),
        cell: Rc::new(OnceCell::new()),
    };

    seed.map = Some(inner.map.clone());
    seed.bind = Some(inner.bind.clone());
    seed.handle = Some(inner.handle.clone());
    seed.finally = Some(inner.finally.clone());
    seed.repeat = Some(inner.repeat.clone());
    seed.for_par = Some(inner.for_par.clone());
    seed.block = Some(inner.block.clone());
    seed.scope = Some(inner.scope.clone());

    let (a, irun) = (anchor.clone(), inner.run.clone());
    seed.run = Some(Rc::new(move |f: Thunk| -> Result<Value> { irun(a.lift_thunk(f)) }));

    if mode == ContextMode::Full {
        let (a, ibind) = (anchor.clone(), inner.bind.clone());
        seed.bind = Some(Rc::new(move |x: Value, f: Kont| -> Result<Value> { ibind(x, a.lift(f)) }));
        let (a, ihandle) = (anchor.clone(), inner.handle.clone());
        seed.handle =
            Some(Rc::new(move |x: Value, f: Kont| -> Result<Value> { ihandle(x, a.lift(f)) }));
        let (a, ifinally) = (anchor.clone(), inner.finally.clone());
        seed.finally =
            Some(Rc::new(move |x: Value, f: Thunk| -> Result<Value> { ifinally(x, a.lift_thunk(f)) }));
        let (a, irepeat) = (anchor.clone(), inner.repeat.clone());
        seed.repeat =
            Some(Rc::new(move |body: Kont, arg: Value| -> Result<Value> { irepeat(a.lift(body), arg) }));
        let (a, ifor_par) = (anchor.clone(), inner.for_par.clone());
        seed.for_par = Some(Rc::new(move |test: Test, body: Kont, step: Kont, arg: Value| -> Result<Value> {
            ifor_par(test, a.lift(body), step, arg)
        }));
        let (a, iblock) = (anchor.clone(), inner.block.clone());
        seed.block = Some(Rc::new(move |body: Body| -> Result<Value> { iblock(a.lift_body(body)) }));
        let (a, iscope) = (anchor.clone(), inner.scope.clone());
        seed.scope = Some(Rc::new(move |body: Body| -> Result<Value> { iscope(a.lift_body(body)) }));
        let (a, iseq) = (anchor.clone(), inner.seq.clone());
        seed.seq = Some(Rc::new(move |source: Source| -> Result<Value> {
            let a = a.clone();
            iseq(Rc::new(move || -> Result<Gen> {
                let generator = a.enter(|| source())?;
                Ok(a.entered(generator))
            }))
        }));
    }

    let def = seed.complete()?;
    let _ = anchor.cell.set(def.downgrade());
    Ok(def)
}
