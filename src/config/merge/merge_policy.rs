//! Merge rules: defaults, override order, conflict handling.

use crate::config::default_cache_capacity;
use crate::platform::PlatformKind;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override these key by key; tables are merged, not replaced.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    let cache_capacity = i64::try_from(default_cache_capacity()).unwrap_or(i64::MAX);
    Config::builder()
        .set_default("test_harness", false)?
        .set_default("platform", PlatformKind::current().as_str())?
        .set_default("storage.cache_capacity_bytes", cache_capacity)
}
