//! Pull sequences and generators.
//!
//! Cursors are immutable: pulling never disturbs earlier cursors, so a sequence may be
//! walked again from any position already seen.

use crate::*;
use indexmap::IndexMap;
use std::{cell::RefCell, rc::Rc};

impl<F> Generator for F
where
    F: Fn(Value) -> Result<Option<(Value, Gen)>>,
{
    fn resume(&self, input: Value) -> Result<Option<(Value, Gen)>> {
        (*self)(input)
    }
}

type Step = Rc<dyn Fn(Value, Value) -> Result<Option<(Value, Value)>>>;

/// A generator threading an explicit state.
///
/// `step(state, input)` yields the next value together with the state to resume from, or
/// `None` once exhausted.
pub fn unfold(
    state: impl Into<Value>, step: impl Fn(Value, Value) -> Result<Option<(Value, Value)>> + 'static,
) -> Gen {
    unfold_from(state.into(), Rc::new(step))
}

fn unfold_from(state: Value, step: Step) -> Gen {
    Rc::new(move |input: Value| -> Result<Option<(Value, Gen)>> {
        let Some((produced, next)) = step(state.clone(), input)? else { return Ok(None) };
        Ok(Some((produced, unfold_from(next, step.clone()))))
    })
}

/// A generator yielding every element of a sequence in turn, ignoring what it is resumed with.
pub fn effects(cursor: Option<Cursor>) -> Gen {
    Rc::new(move |_: Value| -> Result<Option<(Value, Gen)>> {
        Ok(cursor.as_ref().map(|current| (current.value(), effects(current.pull()))))
    })
}

/// Every value `generator` yields, passed through `f`.
pub fn map_yields(generator: Gen, f: Kont) -> Gen {
    Rc::new(move |input: Value| -> Result<Option<(Value, Gen)>> {
        let Some((produced, next)) = generator.resume(input)? else { return Ok(None) };
        Ok(Some((f(produced)?, map_yields(next, f.clone()))))
    })
}

/* --------------------------------- Cursors -------------------------------- */

pub fn from_vector(items: im::Vector<Value>) -> Option<Cursor> {
    vector_at(items, 0)
}

fn vector_at(items: im::Vector<Value>, index: usize) -> Option<Cursor> {
    let value = items.get(index)?.clone();
    Some(Cursor::new(value, move || vector_at(items.clone(), index + 1)))
}

/// Keys of `map` in insertion order.
pub fn keys(map: &IndexMap<Rc<str>, Value>) -> Option<Cursor> {
    from_vector(map.keys().map(|key| Value::Str(key.clone())).collect())
}

struct Buffer<I> {
    source: std::iter::Fuse<I>,
    items: Vec<Value>,
}

/// A sequence over an arbitrary iterator; elements are buffered as they are first pulled.
pub fn buffered<I>(iter: I) -> Option<Cursor>
where
    I: IntoIterator<Item = Value>,
    I::IntoIter: 'static,
{
    let buffer = Rc::new(RefCell::new(Buffer { source: iter.into_iter().fuse(), items: Vec::new() }));
    buffered_at(buffer, 0)
}

fn buffered_at<I>(buffer: Rc<RefCell<Buffer<I>>>, index: usize) -> Option<Cursor>
where
    I: Iterator<Item = Value> + 'static,
{
    let value = {
        let mut buffer = buffer.borrow_mut();
        while buffer.items.len() <= index {
            let next = buffer.source.next()?;
            buffer.items.push(next);
        }
        buffer.items[index].clone()
    };
    Some(Cursor::new(value, move || buffered_at(buffer.clone(), index + 1)))
}
