#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod fresh;
pub mod slot;

pub mod prelude {
    pub use crate::{
        fresh::Fresh,
        fresh_key_type,
        slot::{Restore, Slot},
    };
}
