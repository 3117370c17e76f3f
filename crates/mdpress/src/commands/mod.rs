//! CLI command implementations.

pub(crate) mod clear_cache;
pub(crate) mod convert;

pub(crate) use clear_cache::ClearCacheArgs;
pub(crate) use convert::ConvertArgs;
