use mondo_runtime::*;
use mondo_tests::effects;
use pretty_assertions::assert_eq;
use std::{cell::RefCell, rc::Rc};

fn only(carrier: Option<&str>, context: ContextMode) -> Options {
    Options { carrier: carrier.map(str::to_owned), context, ..Options::bare() }
}

/* --------------------------------- Carrier -------------------------------- */

/// Without `coerce`, so nothing but its own carriers get through.
fn strict() -> Seed {
    Seed::new("strict").pure(Ok).bind(|a, f| f(a))
}

#[test]
fn brands_do_not_mix() {
    let a = build(strict(), &only(Some("a"), ContextMode::Off)).unwrap();
    let b = build(strict(), &only(Some("b"), ContextMode::Off)).unwrap();
    let from_a = a.pure(1).unwrap();
    let again = a.clone();
    assert!(matches!(a.bind(from_a.clone(), move |v| again.pure(v)), Ok(Value::Carrier(_))));
    let err = b.bind(from_a, |v| Ok(v)).unwrap_err();
    assert!(matches!(err, Fault::ForeignCarrier { .. }), "{}", err);
    let err = b.bind(Value::from(1), |v| Ok(v)).unwrap_err();
    assert!(matches!(err, Fault::Expected { .. }), "{}", err);
}

#[test]
fn same_name_still_distinct() {
    let a = build(strict(), &only(Some("m"), ContextMode::Off)).unwrap();
    let b = build(strict(), &only(Some("m"), ContextMode::Off)).unwrap();
    assert!(b.unpack(a.pure(1).unwrap()).is_err());
}

#[test]
fn coerce_admits_raw_values() {
    let options = Options { carrier: Some("m".to_owned()), ..Options::default() };
    let def = build(effects::identity(), &options).unwrap();
    let raw = def.coerce(5).unwrap();
    assert!(matches!(&raw, Value::Carrier(_)));
    assert_eq!(def.coerce(raw.clone()).unwrap(), raw);
    assert_eq!(def.unpack(raw).unwrap(), Value::Int(5));
    // the callback result is raw; coercion packs it
    let out = def.bind(def.pure(1).unwrap(), |v| Ok(Value::Int(v.as_int()? + 1))).unwrap();
    assert_eq!(def.unpack(out).unwrap(), Value::Int(2));
}

#[test]
fn execute_leaves_the_carrier() {
    let options = Options { carrier: Some("m".to_owned()), ..Options::default() };
    let def = build(effects::identity(), &options).unwrap();
    assert_eq!(def.execute(|| facade::pure("done")).unwrap(), Value::from("done"));
}

#[test]
fn reify_and_reflect() {
    let def = build(effects::identity(), &only(Some("m"), ContextMode::Off)).unwrap();
    let reflected = def.reflect(Value::from(3)).unwrap();
    assert!(matches!(&reflected, Value::Carrier(_)));
    assert_eq!(def.reify(move || Ok(reflected.clone())).unwrap(), Value::Int(3));
}

/* ------------------------------ Configuration ----------------------------- */

#[test]
fn config_errors() {
    let err = build(Seed::new("void"), &Options::default()).unwrap_err();
    assert_eq!(err.to_string(), ConfigError::MissingPure { name: "void".to_owned() }.to_string());
    let err = build(strict(), &Options::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingCoerce { .. }), "{}", err);
    let err = Options::from_toml("escape = \"yes\"").unwrap_err();
    assert!(matches!(err, ConfigError::Options(_)), "{}", err);
}

#[test]
fn options_from_toml() {
    let options = Options::from_toml("carrier = \"cfg\"\ncontext = \"off\"").unwrap();
    let def = build(effects::identity(), &options).unwrap();
    assert_eq!(def.name(), "identity+escape+carrier+coerce");
}

#[test]
fn bare_stubs_fail_at_use() {
    let def = build(effects::identity(), &Options::bare()).unwrap();
    match def.block(|k| k(().into())) {
        | Err(Fault::NotImplemented { op, def }) => {
            assert_eq!(op, "block");
            assert_eq!(&*def, "identity");
        }
        | other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(def.raise("e"), Err(Fault::NotImplemented { op: "raise", .. })));
    assert!(matches!(def.plus(1.into(), 2.into()), Err(Fault::NotImplemented { op: "plus", .. })));
}

#[test]
fn overrides_after_layering() {
    let escaped = build(effects::identity(), &only(None, ContextMode::Off)).unwrap();
    let escaped = with_escape_control(&escaped).unwrap();
    let def = escaped.extend("shout").pure(|v| Ok(Value::from(format!("{}!", v.as_str()?)))).complete().unwrap();
    assert_eq!(def.pure("hey").unwrap(), Value::from("hey!"));
    assert_eq!(def.name(), "identity+escape+shout");
    // everything it did not override comes from the layer below
    let out = def.block(|k| k("out".into())).unwrap();
    assert_eq!(settle(out).unwrap(), Value::from("out"));
}

/* --------------------------------- Escapes -------------------------------- */

#[test]
fn uncaught_signals_settle_into_faults() {
    let def = build(effects::identity(), &Options::default()).unwrap();
    let out = def.execute(|| facade::raise("boom")).unwrap();
    assert!(matches!(settle(out), Err(Fault::Thrown(Value::Str(s))) if &*s == "boom"));

    let saved: Rc<RefCell<Option<Kont>>> = Rc::default();
    let keep = saved.clone();
    def.block(move |k| {
        *keep.borrow_mut() = Some(k);
        Ok(().into())
    })
    .unwrap();
    let escape = saved.borrow_mut().take().unwrap();
    assert!(matches!(settle(escape(1.into()).unwrap()), Err(Fault::Escaped(_))));
}

/* --------------------------------- Context -------------------------------- */

/// Continuations run later, when the returned function is called.
fn deferred() -> Seed {
    Seed::new("later").pure(Ok).bind(|a, f| Ok(Value::func(move |_| f(a.clone()))))
}

fn installed() -> Value {
    current().map(|def| Value::from(def.name())).unwrap_or(().into())
}

#[test]
fn continuations_see_their_definition() {
    let def = build(deferred(), &only(None, ContextMode::Full)).unwrap();
    let later = def.bind(1.into(), |_| Ok(installed())).unwrap();
    assert!(current().is_none());
    assert_eq!(later.call(().into()).unwrap(), Value::from("later+context"));
}

#[test]
fn run_only_leaves_continuations_alone() {
    let def = build(deferred(), &only(None, ContextMode::RunOnly)).unwrap();
    let later = def.bind(1.into(), |_| Ok(installed())).unwrap();
    assert_eq!(later.call(().into()).unwrap(), Value::from(()));
    assert_eq!(def.execute(|| Ok(installed())).unwrap(), Value::from("later+context"));
}

#[test]
fn continuations_outliving_the_definition() {
    let def = build(deferred(), &only(None, ContextMode::Full)).unwrap();
    let later = def.bind(1.into(), |_| Ok(installed())).unwrap();
    drop(def);
    match later.call(().into()) {
        | Err(Fault::Detached(name)) => assert_eq!(&*name, "later+context"),
        | other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn extending_keeps_the_context_on_top() {
    let def = build(deferred(), &only(None, ContextMode::Full)).unwrap();
    let shout = def.extend("shout").pure(|v| Ok(Value::list([v]))).complete().unwrap();
    assert_eq!(shout.name(), "later+shout+context");
    assert_eq!(shout.pure(1).unwrap(), Value::list([1.into()]));
    let later = shout.bind(1.into(), |_| Ok(installed())).unwrap();
    assert_eq!(later.call(().into()).unwrap(), Value::from("later+shout+context"));
}

#[test]
fn extending_moves_the_brand_home() {
    let options = Options { carrier: Some("m".to_owned()), ..Options::default() };
    let def = build(effects::identity(), &options).unwrap();
    let more = def.extend("more").complete().unwrap();
    assert_eq!(more.name(), "identity+escape+carrier+coerce+more+context");
    drop(def);
    let one = more.pure(1).unwrap();
    assert!(one.mcontext().unwrap().ptr_eq(&more));
    let two = one.mbind(|v| Ok(Value::Int(v.as_int()? + 1))).unwrap();
    assert_eq!(more.unpack(two).unwrap(), Value::Int(2));
}

/* --------------------------------- Methods -------------------------------- */

#[test]
fn carried_lists() {
    let options = Options { carrier: Some("l".to_owned()), ..Options::default() };
    let def = build(effects::list(), &options).unwrap();
    let ints = |items: &[i64]| Value::list(items.iter().copied().map(Value::from));
    let a = def.coerce(ints(&[1, 2])).unwrap();
    let b = def.coerce(ints(&[3])).unwrap();
    assert_eq!(a.mplus(b.clone()).unwrap().munpack().unwrap(), ints(&[1, 2, 3]));
    assert_eq!(a.malt(vec![b.clone(), b.clone()]).unwrap().munpack().unwrap(), ints(&[1, 2, 3, 3]));
    assert_eq!(b.mopt().unwrap().munpack().unwrap(), Value::list([3.into(), ().into()]));
    let doubled = a.mbind(|v| Ok(Value::list([v.clone(), v]))).unwrap();
    assert_eq!(doubled.munpack().unwrap(), ints(&[1, 1, 2, 2]));
    let prepended = b.munshift_to(ints(&[8, 9])).unwrap();
    assert_eq!(prepended.munpack().unwrap(), Value::list([ints(&[3, 8, 9])]));
    let nested = def.pure(a.clone()).unwrap();
    assert_eq!(nested.mjoin().unwrap().munpack().unwrap(), ints(&[1, 2]));
}

#[test]
fn context_restores_on_exit() {
    let outer = build(effects::identity(), &Options::default()).unwrap();
    let inner = build(effects::list(), &Options::default()).unwrap();
    let seen = outer
        .execute(move || {
            let before = installed();
            let during = inner.execute(|| Ok(installed()))?;
            Ok(Value::list([before, during, installed()]))
        })
        .unwrap();
    assert_eq!(
        seen,
        Value::list([
            "identity+escape+coerce+context".into(),
            Value::list(["list+escape+coerce+context".into()]),
            "identity+escape+coerce+context".into(),
        ])
    );
    assert!(current().is_none());
}
