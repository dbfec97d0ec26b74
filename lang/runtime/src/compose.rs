//! Assembling a definition from a seed and a set of options.

use crate::*;
use serde::{Deserialize, Serialize};

/// Which layers [`build`] stacks on a seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// add `block`, `raise` and `handle`
    pub escape: bool,
    /// wrap values in a carrier with a brand of this name
    pub carrier: Option<String>,
    pub coercion: bool,
    pub context: ContextMode,
    /// where carried values dispatch their methods
    pub dispatch: Dispatch,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            escape: true,
            carrier: None,
            coercion: true,
            context: ContextMode::Full,
            dispatch: Dispatch::Home,
        }
    }
}

impl Options {
    /// Only the derivation, with no layer on top.
    pub fn bare() -> Self {
        Options {
            escape: false,
            carrier: None,
            coercion: false,
            context: ContextMode::Off,
            dispatch: Dispatch::Home,
        }
    }
    pub fn from_toml(s: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Complete `seed`, then add escape control, the carrier, coercion and the context, each
/// only if `options` asks for it, in this order.
///
/// With a carrier and [`Dispatch::Home`], the returned definition is adopted for the
/// carrier's brand.
pub fn build(seed: Seed, options: &Options) -> Built {
    let mut def = seed.complete()?;
    if options.escape {
        def = with_escape_control(&def)?;
    }
    let brand = options.carrier.as_deref().map(Brand::fresh);
    if let Some(brand) = &brand {
        def = with_carrier(&def, brand.clone())?;
    }
    if options.coercion {
        def = with_coercion(&def)?;
    }
    def = with_ambient_context(&def, options.context)?;
    match &brand {
        | Some(brand) if options.dispatch == Dispatch::Home => adopt(brand, &def),
        | _ => {}
    }
    log::debug!("[build] {:?}", def);
    Ok(def)
}
