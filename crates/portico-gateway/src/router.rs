//! Route table: path-prefix to upstream mapping.
//!
//! Prefixes are evaluated longest-first, so a more specific prefix always
//! beats a broader one; duplicate prefixes are rejected at config validation,
//! which makes the match deterministic.

use crate::config::RouteConfig;

/// One resolved route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Path prefix this route owns.
    pub prefix: String,

    /// Upstream base URL, without a trailing slash.
    pub upstream: String,
}

/// Immutable route table built once from configuration.
#[derive(Debug, Default)]
pub struct RouteTable {
    /// Sorted by prefix length, longest first.
    routes: Vec<Route>,
}

impl RouteTable {
    /// Builds a table from config entries.
    #[must_use]
    pub fn new(configs: &[RouteConfig]) -> Self {
        let mut routes: Vec<Route> = configs
            .iter()
            .map(|c| Route {
                prefix: c.prefix.clone(),
                upstream: c.upstream.trim_end_matches('/').to_string(),
            })
            .collect();
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { routes }
    }

    /// Returns the route whose prefix is the longest prefix of `path`,
    /// or `None` if nothing matches.
    #[must_use]
    pub fn match_route(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| path.starts_with(&r.prefix))
    }

    /// Number of configured routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> RouteTable {
        let configs: Vec<RouteConfig> = entries
            .iter()
            .map(|(prefix, upstream)| RouteConfig {
                prefix: (*prefix).to_string(),
                upstream: (*upstream).to_string(),
            })
            .collect();
        RouteTable::new(&configs)
    }

    #[test]
    fn matches_by_prefix() {
        let table = table(&[
            ("/api/v1/", "http://backend:8080"),
            ("/ai/", "http://ai:8000"),
        ]);

        let route = table.match_route("/api/v1/users/42").unwrap();
        assert_eq!(route.upstream, "http://backend:8080");

        let route = table.match_route("/ai/chat").unwrap();
        assert_eq!(route.upstream, "http://ai:8000");
    }

    #[test]
    fn unknown_path_matches_nothing() {
        let table = table(&[("/api/v1/", "http://backend:8080")]);
        assert!(table.match_route("/unknown/").is_none());
    }

    #[test]
    fn longest_prefix_wins() {
        let table = table(&[
            ("/api/", "http://general:8080"),
            ("/api/v1/admin/", "http://admin:8090"),
        ]);

        assert_eq!(
            table.match_route("/api/v1/admin/audit").unwrap().upstream,
            "http://admin:8090"
        );
        assert_eq!(
            table.match_route("/api/v1/users").unwrap().upstream,
            "http://general:8080"
        );
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let a = table(&[("/api/", "http://a"), ("/api/v1/", "http://b")]);
        let b = table(&[("/api/v1/", "http://b"), ("/api/", "http://a")]);

        assert_eq!(a.match_route("/api/v1/x").unwrap().upstream, "http://b");
        assert_eq!(b.match_route("/api/v1/x").unwrap().upstream, "http://b");
    }

    #[test]
    fn upstream_trailing_slash_is_normalized() {
        let table = table(&[("/api/", "http://backend:8080/")]);
        assert_eq!(table.match_route("/api/x").unwrap().upstream, "http://backend:8080");
    }
}
