//! Route table for fake endpoints.
//!
//! The table maps path → method → handler entry. The outer map and each
//! per-path method map sit behind their own readers-writer lock, so request
//! dispatch on one path never serializes against registration on another
//! and endpoints may be registered while traffic is live.

use std::sync::{Arc, RwLock};

use fnv::FnvHashMap;
use serde::Serialize;

use crate::config::{ConfigError, EndpointConfig};
use crate::provider::FakeDataProvider;
use crate::synthesizer::{synthesize, SynthError, Synthesized};

/// Type-erased synthesis entry point for one registered endpoint.
///
/// `Mux::register::<T>` stores the monomorphized `synthesize::<T>` behind
/// this uniform signature; the dispatcher never sees `T`.
pub(crate) type SynthFn =
    fn(&EndpointConfig, &dyn FakeDataProvider) -> Result<Synthesized, SynthError>;

/// One registered (path, method) handler.
pub(crate) struct RouteEntry {
    pub(crate) config: EndpointConfig,
    pub(crate) synth: SynthFn,
}

type MethodMap = Arc<RwLock<FnvHashMap<String, Arc<RouteEntry>>>>;

/// Result of resolving an incoming request against the route table.
pub(crate) enum RouteLookup {
    /// No endpoint is registered under the path.
    NotFound,
    /// The path exists but not for the requested method.
    MethodNotAllowed,
    /// A matching handler entry.
    Found(Arc<RouteEntry>),
}

/// Route table and per-instance default provider for a set of fake
/// endpoints.
///
/// Entries are add-only; re-registering an existing (path, method) pair
/// replaces its handler. The table lives as long as the `Mux` instance
/// and is shared with the dispatcher through an `Arc`.
#[derive(Default)]
pub struct Mux {
    routes: RwLock<FnvHashMap<String, MethodMap>>,
    default_provider: RwLock<Option<Arc<dyn FakeDataProvider>>>,
}

impl Mux {
    /// Create an empty route table with no default provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the instance-wide default fake data provider.
    ///
    /// Expected to be called once before serving begins; calling it again
    /// replaces the previous default. Endpoints with their own `provider`
    /// field are unaffected.
    pub fn set_default_provider(&self, provider: Arc<dyn FakeDataProvider>) {
        *self.default_provider.write().unwrap() = Some(provider);
    }

    /// Get the instance-wide default provider, if one is installed.
    pub(crate) fn default_provider(&self) -> Option<Arc<dyn FakeDataProvider>> {
        self.default_provider.read().unwrap().clone()
    }

    /// Register a fake endpoint producing values of type `T`.
    ///
    /// The config is validated first; on failure nothing is added to the
    /// table. On success the endpoint serves requests as soon as the
    /// dispatcher sees the table, including while traffic is live.
    ///
    /// # Parameters
    ///
    /// - `config` - Endpoint description; `config.provider` overrides the
    ///   mux default for this endpoint
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the violated field when the config
    /// is inconsistent.
    pub fn register<T>(&self, config: EndpointConfig) -> Result<(), ConfigError>
    where
        T: Default + Serialize + 'static,
    {
        config.validate()?;

        let methods = {
            let mut routes = self.routes.write().unwrap();
            routes.entry(config.path.clone()).or_default().clone()
        };

        tracing::debug!(method = %config.method, path = %config.path, "registered endpoint");

        let method = config.method.clone();
        let entry = Arc::new(RouteEntry { config, synth: synthesize::<T> });
        methods.write().unwrap().insert(method, entry);

        Ok(())
    }

    /// List every registered endpoint as `"METHOD PATH"`, sorted for
    /// determinism.
    pub fn routes(&self) -> Vec<String> {
        let mut pairs = Vec::new();

        {
            let routes = self.routes.read().unwrap();
            for (path, methods) in routes.iter() {
                for method in methods.read().unwrap().keys() {
                    pairs.push(format!("{method} {path}"));
                }
            }
        }

        pairs.sort();
        pairs
    }

    /// Resolve a request path and method against the table.
    pub(crate) fn route(&self, path: &str, method: &str) -> RouteLookup {
        let methods = {
            let routes = self.routes.read().unwrap();
            routes.get(path).cloned()
        };

        let Some(methods) = methods else {
            return RouteLookup::NotFound;
        };

        let lookup = match methods.read().unwrap().get(method) {
            Some(entry) => RouteLookup::Found(entry.clone()),
            None => RouteLookup::MethodNotAllowed,
        };
        lookup
    }
}
