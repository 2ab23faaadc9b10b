//! Route policy: which routes skip authentication.
//!
//! Markers are declared once at startup, next to the router, and looked up per
//! request by (method, route template). A handler marker wins over its resource's
//! marker; with neither the route is protected.
use std::collections::HashMap;

use axum::http::Method;

/// `true` = public. Handler-level first, then resource-level, else protected.
pub fn resolve(handler: Option<bool>, resource: Option<bool>) -> bool {
    handler.or(resource).unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    pub handler: Option<bool>,
    pub resource: Option<bool>,
}

impl RoutePolicy {
    pub fn is_public(&self) -> bool {
        resolve(self.handler, self.resource)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

impl RouteKey {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// Immutable policy table, shared read-only across requests.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicyTable {
    routes: HashMap<RouteKey, RoutePolicy>,
}

impl RoutePolicyTable {
    pub fn builder() -> RoutePolicyTableBuilder {
        RoutePolicyTableBuilder::default()
    }

    /// Unknown routes resolve to the default policy (protected).
    ///
    /// axum answers HEAD with the GET handler, so an unregistered HEAD falls back
    /// to the GET entry of the same route.
    pub fn lookup(&self, method: &Method, path: &str) -> RoutePolicy {
        let exact = self.routes.get(&RouteKey::new(method.clone(), path));
        let policy = match exact {
            None if *method == Method::HEAD => self.routes.get(&RouteKey::new(Method::GET, path)),
            found => found,
        };

        policy.copied().unwrap_or_default()
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.lookup(method, path).is_public()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RoutePolicyTableBuilder {
    resources: HashMap<String, bool>,
    handlers: Vec<(RouteKey, String, Option<bool>)>,
}

impl RoutePolicyTableBuilder {
    /// Resource-level marker covering every handler registered under `name`.
    pub fn resource(mut self, name: impl Into<String>, public: bool) -> Self {
        self.resources.insert(name.into(), public);
        self
    }

    /// Register a handler under `resource`, with an optional handler-level marker.
    pub fn route(
        mut self,
        method: Method,
        path: impl Into<String>,
        resource: impl Into<String>,
        public: Option<bool>,
    ) -> Self {
        self.handlers
            .push((RouteKey::new(method, path), resource.into(), public));
        self
    }

    pub fn build(self) -> RoutePolicyTable {
        let resources = self.resources;
        let routes = self
            .handlers
            .into_iter()
            .map(|(key, resource, handler)| {
                let policy = RoutePolicy {
                    handler,
                    resource: resources.get(&resource).copied(),
                };
                (key, policy)
            })
            .collect();

        RoutePolicyTable { routes }
    }
}
