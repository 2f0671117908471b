//! Route table lookup.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact path match only; the table is small and literal
//! - Explicit no-match rather than a silent default

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::Method;

use crate::config::validation::ValidationError;
use crate::config::RouteConfig;
use crate::routing::route::ProxyRoute;

/// The compiled set of routes the relay serves.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<ProxyRoute>>,
}

impl RouteTable {
    /// Compile route configs, in declaration order.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, ValidationError> {
        let routes = configs
            .iter()
            .map(|c| ProxyRoute::try_from(c).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    /// Find the route for an exact method and path.
    pub fn find(&self, method: &Method, path: &str) -> Option<&Arc<ProxyRoute>> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.path == path)
    }

    /// Routes grouped by public path, for mounting one method router per path.
    pub fn by_path(&self) -> BTreeMap<&str, Vec<Arc<ProxyRoute>>> {
        let mut grouped: BTreeMap<&str, Vec<Arc<ProxyRoute>>> = BTreeMap::new();
        for route in &self.routes {
            grouped
                .entry(route.path.as_str())
                .or_default()
                .push(Arc::clone(route));
        }
        grouped
    }
}
