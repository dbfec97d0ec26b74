//! Rendering of values.

use crate::*;
use pretty::RcDoc;
use std::fmt;

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>)]
pub trait Pretty {
    fn pretty(&self) -> RcDoc<'_>;
}

const WIDTH: usize = 80;

/// `open a, b, c close`, breaking after commas when the group does not fit
fn delimited<'a>(open: &'a str, docs: Vec<RcDoc<'a>>, close: &'a str) -> RcDoc<'a> {
    let body = RcDoc::concat(
        docs.into_iter()
            .enumerate()
            .flat_map(|(i, d)| {
                if i == 0 { vec![d] } else { vec![RcDoc::text(","), RcDoc::line(), d] }
            })
            .collect::<Vec<_>>(),
    );
    RcDoc::text(open)
        .append(RcDoc::concat([RcDoc::line_(), body]).nest(2))
        .append(RcDoc::line_())
        .append(RcDoc::text(close))
        .group()
}

impl Pretty for Value {
    fn pretty(&self) -> RcDoc<'_> {
        match self {
            | Value::Triv(Triv) => RcDoc::text("()"),
            | Value::Bool(b) => RcDoc::text(b.to_string()),
            | Value::Int(i) => RcDoc::text(i.to_string()),
            | Value::Str(s) => RcDoc::text(format!("{:?}", s)),
            | Value::List(items) => delimited("[", items.iter().map(Pretty::pretty).collect(), "]"),
            | Value::Ctor(ctor) => ctor.pretty(),
            | Value::Func(_) => RcDoc::text("<fn>"),
            | Value::Object(obj) => RcDoc::text(format!("<{:?}>", obj)),
            | Value::Cursor(cursor) => RcDoc::text("cursor@").append(cursor.value.pretty()),
            | Value::Unwind(unwind) => unwind.pretty(),
            | Value::Carrier(carrier) => carrier.pretty(),
        }
    }
}

impl Pretty for Ctor {
    fn pretty(&self) -> RcDoc<'_> {
        let Ctor(CtorName(name), arg) = self;
        RcDoc::text(name.as_str()).append(delimited("(", vec![arg.pretty()], ")"))
    }
}

impl Pretty for Unwind {
    fn pretty(&self) -> RcDoc<'_> {
        let tag = match self.tag {
            | Tag::Exception => "exception".to_string(),
            | Tag::Scope(tag) => format!("scope{}", tag.concise()),
        };
        RcDoc::text(format!("unwind[{}]", tag)).append(delimited("(", vec![self.payload.pretty()], ")"))
    }
}

impl Pretty for Carrier {
    fn pretty(&self) -> RcDoc<'_> {
        RcDoc::text(self.brand.to_string()).append(delimited("{", vec![self.inner.pretty()], "}"))
    }
}

macro_rules! display_by_pretty {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.pretty().render_fmt(WIDTH, f)
                }
            }
        )*
    };
}

display_by_pretty!(Value, Ctor, Unwind, Carrier);
