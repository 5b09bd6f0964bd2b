use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::data_handler::{
    CompressedHandler, CustomBarsHandler, DataHandler, DefaultFractionsHandler, DefaultHandler,
    ErrorBarsHandler, FractionBarsHandler, HandlerConfig, RawHandler, RebaseBase, RebaseHandler,
};
use crate::error::{ChartError, ChartResult};

/// Builds a handler for one chart.
pub type HandlerFactory = Arc<dyn Fn(&HandlerConfig) -> Arc<dyn DataHandler> + Send + Sync>;

/// Named data handler factories.
///
/// The registry is an owned value handed to [`super::ChartEngine::new`].
/// Registering an existing name replaces the earlier factory.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: IndexMap<String, HandlerFactory>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in handler.
    #[must_use]
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        registry.register("default", |_| Arc::new(DefaultHandler));
        registry.register("default-fractions", |_| Arc::new(DefaultFractionsHandler));
        registry.register("bars-error", |config| Arc::new(ErrorBarsHandler::new(config)));
        registry.register("bars-custom", |_| Arc::new(CustomBarsHandler));
        registry.register("bars-fractions", |config| {
            Arc::new(FractionBarsHandler::new(config))
        });
        registry.register("raw", |_| Arc::new(RawHandler));
        registry.register("compressed", |_| Arc::new(CompressedHandler));
        registry.register("rebase", |config| Arc::new(RebaseHandler::new(config.rebase)));
        registry.register("rebase-percent", |_| {
            Arc::new(RebaseHandler::new(RebaseBase::Percent))
        });
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&HandlerConfig) -> Arc<dyn DataHandler> + Send + Sync + 'static,
    {
        let name = name.into();
        let replaced = self.factories.insert(name.clone(), Arc::new(factory)).is_some();
        debug!(name = %name, replaced, "registered data handler");
    }

    /// Instantiates the handler registered under `name`.
    pub fn get(&self, name: &str, config: &HandlerConfig) -> ChartResult<Arc<dyn DataHandler>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ChartError::UnknownHandler {
                name: name.to_owned(),
            })?;
        Ok(factory(config))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::HandlerRegistry;
    use crate::core::data_handler::{HandlerConfig, RawHandler};
    use crate::error::ChartError;

    #[test]
    fn builtin_names_resolve() {
        let registry = HandlerRegistry::with_builtin_handlers();
        let config = HandlerConfig::default();
        for name in registry.names() {
            let handler = registry.get(name, &config).expect("builtin handler");
            if name != "rebase-percent" {
                assert_eq!(handler.name(), name);
            }
        }
    }

    #[test]
    fn unknown_name_fails() {
        let registry = HandlerRegistry::new();
        let err = registry
            .get("default", &HandlerConfig::default())
            .expect_err("empty registry");
        assert!(matches!(err, ChartError::UnknownHandler { name } if name == "default"));
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = HandlerRegistry::with_builtin_handlers();
        registry.register("default", |_| Arc::new(RawHandler));
        let handler = registry
            .get("default", &HandlerConfig::default())
            .expect("handler");
        assert_eq!(handler.name(), "raw");
    }
}
