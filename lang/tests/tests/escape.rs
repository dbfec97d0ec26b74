use mondo_runtime::{Result, Value, facade::*};
use mondo_tests::{kit::*, record};
use pretty_assertions::assert_eq;

fn break_in_finally_cancels_break() -> Result<Value> {
    then(rec("a")?, || {
        let outer = block(|l1| {
            then(rec("l1")?, move || {
                let l1 = l1.clone();
                let inner = block(move |l2| {
                    let l1 = l1.clone();
                    let body = then(rec("l2")?, move || l1(().into()))?;
                    finally(body, move || {
                        let l2 = l2.clone();
                        then(rec("f1")?, move || l2(().into()))
                    })
                })?;
                then(inner, || rec("al2"))
            })
        })?;
        then(outer, || rec("al1"))
    })
}

#[test]
fn escape_in_cleanup_supersedes_escape() {
    each(break_in_finally_cancels_break, record!["a", "l1", "l2", "f1", "al2", "al1"]);
}

fn break_in_finally_cancels_throw() -> Result<Value> {
    then(rec("a")?, || {
        let outer = block(|l1| {
            then(rec("l1")?, move || {
                let l1 = l1.clone();
                let thrown = then(rec("error")?, || raise("e"))?;
                let cleaned = finally(thrown, move || {
                    let l1 = l1.clone();
                    then(rec("fin")?, move || l1(().into()))
                })?;
                then(cleaned, || rec("at"))
            })
        })?;
        then(outer, || rec("al1"))
    })
}

#[test]
fn escape_in_cleanup_supersedes_exception() {
    each(break_in_finally_cancels_throw, record!["a", "l1", "error", "fin", "al1"]);
}

fn try_catch_finally(throw: bool) -> Result<Value> {
    then(rec("bi")?, move || {
        let body = then(rec("t")?, move || if throw { raise("e") } else { pure(()) })?;
        let caught = handle(body, |e| rec(format!("e:{}", e.as_str()?)))?;
        let done = finally(caught, || rec("f"))?;
        then(done, || rec("af"))
    })
}

#[test]
fn catch_then_cleanup() {
    each(|| try_catch_finally(false), record!["bi", "t", "f", "af"]);
    each(|| try_catch_finally(true), record!["bi", "t", "e:e", "f", "af"]);
}

fn break_runs_cleanup() -> Result<Value> {
    let labeled = block(|lab| {
        let body = then(rec("a1")?, move || then(lab(().into())?, || rec("a2")))?;
        then(finally(body, || rec("f"))?, || rec("a3"))
    })?;
    then(labeled, || rec("a4"))
}

#[test]
fn cleanup_on_break() {
    each(break_runs_cleanup, record!["a1", "f", "a4"]);
}

/// `continue` as an escape from the iteration, `break` as an escape from the whole loop.
fn labeled_loops() -> Result<Value> {
    let looped = block(|brk| {
        for_par(
            |i| Ok(i.as_int()? < 3),
            move |i| {
                let (brk, i) = (brk.clone(), i.as_int()?);
                block(move |cont| {
                    let (brk, cont) = (brk.clone(), cont.clone());
                    let body = then(rec(format!("bj:{}", i))?, move || {
                        let (brk, cont) = (brk.clone(), cont.clone());
                        let inner = for_par(
                            |j| Ok(j.as_int()? < 40),
                            move |j| {
                                let (brk, j) = (brk.clone(), j.as_int()?);
                                let attempt = match j {
                                    | 10 => cont(().into())?,
                                    | 30 => raise("z")?,
                                    | _ => rec(i + j)?,
                                };
                                let caught = handle(attempt, move |e| {
                                    let brk = brk.clone();
                                    then(rec(format!("c1:{}", e.as_str()?))?, move || brk(().into()))
                                })?;
                                finally(caught, move || rec(format!("f1:{}:{}", i, j)))
                            },
                            |j| Ok(Value::Int(j.as_int()? + 10)),
                            0,
                        )?;
                        then(inner, move || rec(format!("aj:{}", i)))
                    })?;
                    let caught = handle(body, |e| rec(format!("cj:{}", e.as_str()?)))?;
                    finally(caught, move || rec(format!("fj:{}", i)))
                })
            },
            |i| Ok(Value::Int(i.as_int()? + 1)),
            0,
        )
    })?;
    then(looped, || rec("ai"))
}

#[test]
fn continue_and_break_through_cleanups() {
    each(
        labeled_loops,
        record![
            "bj:0", 0, "f1:0:0", "f1:0:10", "fj:0", "bj:1", 1, "f1:1:0", "f1:1:10", "fj:1", "bj:2", 2,
            "f1:2:0", "f1:2:10", "fj:2", "ai",
        ],
    );
}

/// The handler of an inner exception breaks out of both loops.
fn break_from_handler() -> Result<Value> {
    let looped = block(|brk| {
        for_par(
            |i| Ok(i.as_int()? < 3),
            move |i| {
                let (brk, i) = (brk.clone(), i.as_int()?);
                for_par(
                    |j| Ok(j.as_int()? < 40),
                    move |j| {
                        let (brk, j) = (brk.clone(), j.as_int()?);
                        let attempt = if j == 30 { raise("z")? } else { rec(i + j)? };
                        let caught = handle(attempt, move |e| {
                            let brk = brk.clone();
                            then(rec(format!("c1:{}", e.as_str()?))?, move || brk(().into()))
                        })?;
                        finally(caught, || rec("f1"))
                    },
                    |j| Ok(Value::Int(j.as_int()? + 10)),
                    0,
                )
            },
            |i| Ok(Value::Int(i.as_int()? + 1)),
            0,
        )
    })?;
    then(looped, || rec("ai"))
}

#[test]
fn handler_escapes_both_loops() {
    each(break_from_handler, record![0, "f1", 10, "f1", 20, "f1", "c1:z", "f1", "ai"]);
}

fn uncaught() -> Result<Value> {
    then(rec("a")?, || then(raise("lost")?, || rec("b")))
}

#[test]
fn uncaught_exception_skips_the_rest() {
    init();
    for def in grid() {
        take();
        let out = def.execute(uncaught).unwrap();
        // whatever the representation, nothing ran after the raise
        assert_eq!(take(), record!["a"], "on {:?}", def);
        assert!(!out.is_triv(), "on {:?}", def);
    }
}
