//! Gallery infrastructure
//!
//! Process-level plumbing shared by the pipeline: tracing setup, parameter
//! resolution and the frontend cache revalidation notifier.

pub mod params;
pub mod revalidation;
pub mod telemetry;

pub use params::{
    CachedParameters, EnvParameterResolver, ParameterResolver, RevalidationParams,
    StaticParameterResolver,
};
pub use revalidation::{CacheRevalidator, RevalidationNotifier, RevalidationNotifierConfig};
pub use telemetry::init_telemetry;
