//! Re-exports from either `regex` or `regex_lite`, depending on features.
//!
//! `regex_lite` only knows ASCII word characters, so with the `lite` feature
//! accented letters count as word boundaries.

#[cfg(feature = "lite")]
pub(crate) use regex_lite::{Regex, escape};
#[cfg(all(feature = "regex", not(feature = "lite")))]
pub(crate) use regex::{Regex, escape};

#[cfg(not(any(feature = "regex", feature = "lite")))]
compile_error!("drug-mentions requires the \"regex\" or \"lite\" feature to be enabled");
