//! Effect definitions and a recording kit shared by the integration tests.

pub mod effects {
    use mondo_runtime::*;

    /// Plain values are effect values; every operation runs immediately.
    pub fn identity() -> Seed {
        Seed::new("identity").pure(Ok).coerce(Ok).bind(|a, f| f(a)).run(|f| f())
    }

    /// [`identity`] with escape control and loops that iterate instead of recursing; a loop
    /// stops at the first signal its body produces.
    pub fn looping() -> std::result::Result<Seed, ConfigError> {
        let escaped = with_escape_control(&identity().complete()?)?;
        Ok(escaped
            .extend("loops")
            .for_par(|test, body, step, arg| {
                let mut arg = arg;
                while test(&arg)? {
                    let res = body(arg.clone())?;
                    if res.is_unwind() {
                        return Ok(res);
                    }
                    arg = step(arg)?;
                }
                Ok(arg)
            })
            .repeat(|body, arg| {
                let mut next = arg;
                loop {
                    next = body(next)?;
                    if next.is_unwind() {
                        return Ok(next);
                    }
                }
            }))
    }

    fn is_outcome(v: &Value) -> bool {
        v.as_ctor("Ok").is_some() || v.as_ctor("Err").is_some()
    }

    /// `Ok(v)` or `Err(e)`; exceptions are native.
    pub fn either() -> Seed {
        Seed::new("either")
            .pure(|v| Ok(Value::ctor("Ok", v)))
            .coerce(|v| Ok(if is_outcome(&v) { v } else { Value::ctor("Ok", v) }))
            .raise(|e| Ok(Value::ctor("Err", e)))
            .bind(|a, f| match a.as_ctor("Ok") {
                | Some(v) => f(v.clone()),
                | None => Ok(a),
            })
            .handle(|a, f| match a.as_ctor("Err") {
                | Some(e) => f(e.clone()),
                | None => Ok(a),
            })
    }

    /// Lists of every possible result.
    pub fn list() -> Seed {
        Seed::new("list")
            .pure(|v| Ok(Value::list([v])))
            .coerce(|v| Ok(if matches!(v, Value::List(_)) { v } else { Value::list([v]) }))
            .bind(|a, f| {
                let mut out = Vec::new();
                for x in a.into_list()? {
                    out.extend(f(x)?.into_list()?);
                }
                Ok(Value::list(out))
            })
            .plus(|a, b| {
                let mut a = a.into_list()?;
                a.append(b.into_list()?);
                Ok(Value::List(a))
            })
            .empty(|| Ok(Value::list([])))
    }

    fn unbox(a: Value) -> Result<Value> {
        match a.as_ctor("Box") {
            | Some(v) => Ok(v.clone()),
            | None => Err(Fault::Expected { expected: "a box", found: a }),
        }
    }

    /// `Box(v)`, given by `join` and `map` only.
    pub fn boxed() -> Seed {
        Seed::new("box")
            .pure(|v| Ok(Value::ctor("Box", v)))
            .join(unbox)
            .map(|a, f| Ok(Value::ctor("Box", f(unbox(a)?)?)))
    }
}

pub mod kit {
    use mondo_runtime::*;
    use std::cell::RefCell;

    thread_local! {
        static STATE: RefCell<Vec<Value>> = const { RefCell::new(Vec::new()) };
    }

    pub fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Record `v` as an effect of the ambient definition.
    pub fn rec(v: impl Into<Value>) -> Result<Value> {
        let v = v.into();
        log::trace!("[rec] {}", v);
        STATE.with(|state| state.borrow_mut().push(v));
        facade::pure(())
    }

    /// Everything recorded so far; the record starts over.
    pub fn take() -> Vec<Value> {
        STATE.with(|state| std::mem::take(&mut *state.borrow_mut()))
    }

    /// `a`, then `f()`, ignoring the result of `a`.
    pub fn then(a: Value, f: impl Fn() -> Result<Value> + 'static) -> Result<Value> {
        facade::bind(a, move |_| f())
    }

    /// The bases every control scenario runs on, each under every combination of layers.
    pub fn grid() -> Vec<Definition> {
        use super::effects::*;
        let bases = [(identity(), true), (either(), true), (looping().unwrap(), false)];
        let mut defs = Vec::new();
        for (seed, escape) in bases {
            for carrier in [None, Some("wrapped")] {
                for coercion in [false, true] {
                    for context in [ContextMode::Off, ContextMode::RunOnly, ContextMode::Full] {
                        let carrier = carrier.map(str::to_owned);
                        let options = Options { escape, carrier, coercion, context, ..Options::default() };
                        let def = build(seed.clone(), &options)
                            .unwrap_or_else(|err| panic!("{:?}: {}", options, err));
                        defs.push(def);
                    }
                }
            }
        }
        defs
    }

    /// Run `program` on every definition of the grid, expecting the same record each time.
    pub fn each(program: fn() -> Result<Value>, expected: Vec<Value>) {
        init();
        for def in grid() {
            take();
            let out = def.execute(program);
            assert!(out.is_ok(), "{:?} failed: {}", def, out.unwrap_err());
            pretty_assertions::assert_eq!(take(), expected, "on {:?}", def);
        }
    }
}

/// Compare the record against the given values.
#[macro_export]
macro_rules! check {
    ($($v:expr),* $(,)?) => {
        ::pretty_assertions::assert_eq!($crate::kit::take(), $crate::record![$($v),*])
    };
}

/// The expected record of a scenario.
#[macro_export]
macro_rules! record {
    ($($v:expr),* $(,)?) => {
        {
            let record: Vec<::mondo_runtime::Value> = vec![$(::mondo_runtime::Value::from($v)),*];
            record
        }
    };
}
