//! Compiled-artifact cache for descriptor files.
//!
//! [`CompiledCache`] decodes a source once and stores the result as a
//! compact artifact under a [`CacheRoot`]. Later loads read the artifact as
//! long as it is at least as new as its source. [`CachePurger`] removes all
//! artifacts so the next load of every source recompiles.
//!
//! Both resolve their root from `WALKCACHE_CACHE_DIR` when built with
//! `from_env`, falling back to `<temp dir>/walkcache`.

mod codec;
mod purge;
mod root;
mod store;

pub use codec::{ArtifactCodec, DEFAULT_COMPRESSION_LEVEL};
pub use purge::CachePurger;
pub use root::{CacheRoot, is_artifact_name, is_temp_name};
pub use store::{CompiledCache, Freshness, Loaded, Origin};
