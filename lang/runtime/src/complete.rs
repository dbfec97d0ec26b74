//! Deriving a complete table from a seed.

use crate::{
    def::{missing, Reanchor},
    *,
};
use std::rc::Rc;

impl Seed {
    /// Fill every gap of this seed with an operation derived from what it supplies.
    ///
    /// Only a missing `pure` is refused; operations with no possible source become stubs
    /// failing with [`Fault::NotImplemented`] at first use.
    ///
    /// Derived `repeat` and `for_par` run each iteration inside the `bind` continuation of
    /// the previous one, so the native stack grows with the iteration count whenever `bind`
    /// calls its continuation right away. Running out of stack aborts the process. Seeds
    /// expecting more than a few thousand iterations should supply iterative `repeat` and
    /// `for_par`, which every layer keeps.
    pub fn complete(self) -> Built {
        let name: Rc<str> = self.name.clone().unwrap_or_else(|| "anonymous".into());
        let supplied = self.supplied();
        let (context, brand, reanchor) = (self.context, self.brand.clone(), self.reanchor.clone());
        let Some(pure) = self.pure.clone() else {
            return Err(ConfigError::MissingPure { name: name.to_string() });
        };

        let coerce: Op1 = match &self.coerce {
            | Some(coerce) => coerce.clone(),
            | None => Rc::new(|v: Value| -> Result<Value> { Ok(v) }),
        };

        /* ---------------------------------- Monad --------------------------------- */

        let bind: OpKont = match (&self.bind, &self.join, &self.map) {
            | (Some(bind), _, _) => bind.clone(),
            | (None, Some(join), Some(map)) => {
                let (join, map) = (join.clone(), map.clone());
                Rc::new(move |a: Value, f: Kont| -> Result<Value> { join(map(a, f)?) })
            }
            | (None, _, _) => Rc::new(|a: Value, f: Kont| -> Result<Value> {
                match a {
                    | Value::Object(object) => object.0.mbind(f),
                    | carried @ Value::Carrier(_) => carried.mbind(move |v| f(v)),
                    | found => Err(Fault::Expected { expected: "a value with `mbind`", found }),
                }
            }),
        };
        let map: OpKont = match &self.map {
            | Some(map) => map.clone(),
            | None => {
                let (bind, pure) = (bind.clone(), pure.clone());
                Rc::new(move |a: Value, f: Kont| -> Result<Value> {
                    let pure = pure.clone();
                    bind(a, kont(move |v| pure(f(v)?)))
                })
            }
        };
        let join: Op1 = match &self.join {
            | Some(join) => join.clone(),
            | None => {
                let bind = bind.clone();
                Rc::new(move |m: Value| -> Result<Value> { bind(m, kont(Ok)) })
            }
        };

        /* -------------------------------- Products -------------------------------- */

        let pair: Op2 = match (&self.pair, &self.arr) {
            | (Some(pair), _) => pair.clone(),
            | (None, Some(arr)) => {
                let arr = arr.clone();
                Rc::new(move |a: Value, b: Value| -> Result<Value> { arr(vec![a, b]) })
            }
            | (None, None) => {
                let (bind, map) = (bind.clone(), map.clone());
                Rc::new(move |a: Value, b: Value| -> Result<Value> {
                    let (map, b) = (map.clone(), b.clone());
                    bind(
                        a,
                        kont(move |av| {
                            map(b.clone(), kont(move |bv| Ok(Value::list([av.clone(), bv]))))
                        }),
                    )
                })
            }
        };
        let arr: OpList = match &self.arr {
            | Some(arr) => arr.clone(),
            | None => {
                let (pure, map, pair) = (pure.clone(), map.clone(), pair.clone());
                Rc::new(move |items: Vec<Value>| -> Result<Value> {
                    arr_of(&items, &pure, &map, &pair)
                })
            }
        };

        /* ---------------------------------- Loops --------------------------------- */

        let repeat: OpRepeat = match &self.repeat {
            | Some(repeat) => repeat.clone(),
            | None => {
                let bind = bind.clone();
                Rc::new(move |body: Kont, arg: Value| -> Result<Value> {
                    repeat_from(&bind, &body, arg)
                })
            }
        };
        let for_par: OpForPar = match &self.for_par {
            | Some(for_par) => for_par.clone(),
            | None => {
                let (pure, bind) = (pure.clone(), bind.clone());
                Rc::new(move |test: Test, body: Kont, step: Kont, arg: Value| -> Result<Value> {
                    Loop { pure: pure.clone(), bind: bind.clone(), test, body, step }.iterate(arg)
                })
            }
        };

        /* ---------------------------------- Runs ---------------------------------- */

        let reify: OpRun = match &self.reify {
            | Some(reify) => reify.clone(),
            | None => Rc::new(|f: Thunk| -> Result<Value> { f() }),
        };
        let reflect: Op1 = match &self.reflect {
            | Some(reflect) => reflect.clone(),
            | None => Rc::new(|a: Value| -> Result<Value> { Ok(a) }),
        };
        let run: OpRun = self.run.clone().unwrap_or_else(|| reify.clone());

        /* --------------------------------- Control -------------------------------- */

        let raise: Op1 = match &self.raise {
            | Some(raise) => raise.clone(),
            | None => {
                let name = name.clone();
                Rc::new(move |_: Value| -> Result<Value> { Err(missing(&name, OpName::Raise)) })
            }
        };
        let handle: OpKont = match &self.handle {
            | Some(handle) => handle.clone(),
            | None => {
                let name = name.clone();
                Rc::new(move |_: Value, _: Kont| -> Result<Value> {
                    Err(missing(&name, OpName::Handle))
                })
            }
        };
        let block: OpBlock = match &self.block {
            | Some(block) => block.clone(),
            | None => {
                let name = name.clone();
                Rc::new(move |_: Body| -> Result<Value> { Err(missing(&name, OpName::Block)) })
            }
        };
        let scope: OpBlock = match (&self.scope, &self.block) {
            | (Some(scope), _) => scope.clone(),
            | (None, Some(block)) => block.clone(),
            | (None, None) => {
                let name = name.clone();
                Rc::new(move |_: Body| -> Result<Value> { Err(missing(&name, OpName::Scope)) })
            }
        };
        let constant: Op2 = match &self.constant {
            | Some(constant) => constant.clone(),
            | None => {
                let map = map.clone();
                Rc::new(move |a: Value, v: Value| -> Result<Value> {
                    map(a, kont(move |_| Ok(v.clone())))
                })
            }
        };
        let finally: OpFinally = match &self.finally {
            | Some(finally) => finally.clone(),
            | None => {
                let (bind, raise, handle, constant) =
                    (bind.clone(), raise.clone(), handle.clone(), constant.clone());
                Rc::new(move |a: Value, f: Thunk| -> Result<Value> {
                    let (bind_, raise, f_) = (bind.clone(), raise.clone(), f.clone());
                    let handled = handle(
                        a,
                        kont(move |e| {
                            let raise = raise.clone();
                            bind_(f_()?, kont(move |_| raise(e.clone())))
                        }),
                    )?;
                    let constant = constant.clone();
                    bind(handled, kont(move |v| constant(f()?, v)))
                })
            }
        };

        /* ------------------------------ Alternatives ------------------------------ */

        let plus: Op2 = match (&self.plus, &self.alt) {
            | (Some(plus), _) => plus.clone(),
            | (None, Some(alt)) => {
                let alt = alt.clone();
                Rc::new(move |a: Value, b: Value| -> Result<Value> { alt(vec![a, b]) })
            }
            | (None, None) => {
                let name = name.clone();
                Rc::new(move |_: Value, _: Value| -> Result<Value> {
                    Err(missing(&name, OpName::Plus))
                })
            }
        };
        let empty: Op0 = match (&self.empty, &self.alt) {
            | (Some(empty), _) => empty.clone(),
            | (None, Some(alt)) => {
                let alt = alt.clone();
                Rc::new(move || -> Result<Value> { alt(Vec::new()) })
            }
            | (None, None) => {
                let name = name.clone();
                Rc::new(move || -> Result<Value> { Err(missing(&name, OpName::Empty)) })
            }
        };
        let alt: OpList = match &self.alt {
            | Some(alt) => alt.clone(),
            | None => {
                let (plus, empty) = (plus.clone(), empty.clone());
                Rc::new(move |alts: Vec<Value>| -> Result<Value> {
                    let mut alts = alts.into_iter();
                    let Some(first) = alts.next() else { return empty() };
                    alts.try_fold(first, |acc, next| plus(acc, next))
                })
            }
        };
        let opt: Op1 = match &self.opt {
            | Some(opt) => opt.clone(),
            | None => {
                let (plus, pure) = (plus.clone(), pure.clone());
                Rc::new(move |a: Value| -> Result<Value> { plus(a, pure(Value::from(()))?) })
            }
        };

        /* ---------------------------------- Misc ---------------------------------- */

        let unshift_to: Op2 = match &self.unshift_to {
            | Some(unshift_to) => unshift_to.clone(),
            | None => {
                let map = map.clone();
                Rc::new(move |a: Value, list: Value| -> Result<Value> {
                    map(
                        a,
                        kont(move |v| {
                            let mut items = list.clone().into_list()?;
                            items.push_front(v);
                            Ok(Value::List(items))
                        }),
                    )
                })
            }
        };
        let pack: Op1 = match &self.pack {
            | Some(pack) => pack.clone(),
            | None => Rc::new(|v: Value| -> Result<Value> { Ok(v) }),
        };
        let unpack: Op1 = match &self.unpack {
            | Some(unpack) => unpack.clone(),
            | None => Rc::new(|v: Value| -> Result<Value> { Ok(v) }),
        };
        let seq: OpSeq = match &self.seq {
            | Some(seq) => seq.clone(),
            | None => {
                let (bind, pure) = (bind.clone(), pure.clone());
                Rc::new(move |source: Source| -> Result<Value> {
                    walk(&bind, &pure, source()?, Value::from(()))
                })
            }
        };

        log::trace!(
            "[complete] {} supplies {}",
            name,
            supplied.iter().map(|op| op.as_str()).collect::<Vec<_>>().join(", ")
        );

        let def = Definition::new(Table {
            name,
            base: self.base,
            context,
            brand,
            supplied,
            pure,
            raise,
            coerce,
            bind,
            map,
            join,
            pair,
            arr,
            handle,
            finally,
            constant,
            unshift_to,
            alt,
            plus,
            empty,
            opt,
            block,
            scope,
            repeat,
            for_par,
            seq,
            run,
            reify,
            reflect,
            pack,
            unpack,
        });
        let Some(Reanchor { mode, brand }) = reanchor else { return Ok(def) };
        let def = with_ambient_context(&def, mode)?;
        if let Some(brand) = brand {
            adopt(&brand, &def);
        }
        Ok(def)
    }
}

/* --------------------------------- Helpers -------------------------------- */

fn arr_of(items: &[Value], pure: &Op1, map: &OpKont, pair: &Op2) -> Result<Value> {
    match items {
        | [] => pure(Value::list([])),
        | [x] => map(x.clone(), kont(|v| Ok(Value::list([v])))),
        | [a, b] => pair(a.clone(), b.clone()),
        | [head, rest @ ..] => {
            let tail = arr_of(rest, pure, map, pair)?;
            map(
                pair(head.clone(), tail)?,
                kont(|v| {
                    let parts = v.into_list()?;
                    match (parts.get(0), parts.get(1)) {
                        | (Some(head), Some(tail)) => {
                            let mut items = tail.clone().into_list()?;
                            items.push_front(head.clone());
                            Ok(Value::List(items))
                        }
                        | _ => Err(Fault::Expected { expected: "a pair", found: Value::List(parts.clone()) }),
                    }
                }),
            )
        }
    }
}

/// One native frame group per iteration; see [`Seed::complete`].
fn repeat_from(bind: &OpKont, body: &Kont, arg: Value) -> Result<Value> {
    let next = body(arg)?;
    let (bind_, body) = (bind.clone(), body.clone());
    bind(next, kont(move |v| repeat_from(&bind_, &body, v)))
}

/// The state of a derived `forPar`; iterations run one after another.
#[derive(Clone)]
struct Loop {
    pure: Op1,
    bind: OpKont,
    test: Test,
    body: Kont,
    step: Kont,
}

impl Loop {
    fn iterate(self, arg: Value) -> Result<Value> {
        if !(self.test)(&arg)? {
            return (self.pure)(arg);
        }
        let next = (self.body)(arg.clone())?;
        let bind = self.bind.clone();
        bind(
            next,
            kont(move |_| {
                let arg = (self.step)(arg.clone())?;
                self.clone().iterate(arg)
            }),
        )
    }
}

fn walk(bind: &OpKont, pure: &Op1, generator: Gen, input: Value) -> Result<Value> {
    match generator.resume(input.clone())? {
        | None => pure(input),
        | Some((produced, next)) => {
            let (bind_, pure) = (bind.clone(), pure.clone());
            bind(produced, kont(move |v| walk(&bind_, &pure, next.clone(), v)))
        }
    }
}
