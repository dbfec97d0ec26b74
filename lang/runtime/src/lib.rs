#![allow(clippy::style)]
#![allow(clippy::type_complexity)]

pub mod err;
pub use err::*;

pub mod def;
pub use def::*;

mod complete;

pub mod escape;
pub use escape::{settle, with_escape_control};
pub mod carrier;
pub use carrier::with_carrier;
pub mod coerce;
pub use coerce::with_coercion;
pub mod ambient;
pub use ambient::{current, lift, set_current, with_ambient_context, with_context, ContextMode};

pub mod methods;
pub use methods::{adopt, Carried, Dispatch};

pub mod compose;
pub use compose::{build, Options};
pub mod facade;
pub mod pull;

pub use mondo_syntax::*;
