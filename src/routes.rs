use crate::config::ApiScope;
use crate::request::normalize_path;
use http::Method;

/// What a route does once it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Liveness check: answers the 999 sentinel.
    Alive,
    /// Answer `200` and stop the server.
    Stop,
    /// A literal JSON body.
    Json(&'static str),
    /// A JSON file from the fixture directory.
    Fixture(&'static str),
    ChunkUploadConfig,
    DifsAssemble,
    /// Log the raw body and answer `{}`.
    Envelope,
}

/// A `(method, path)` pair and the behaviour it is mapped to.
///
/// `pattern` is stored normalized, i.e. without leading or trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub pattern: String,
    pub action: Action,
}

impl Route {
    pub fn new(method: Method, pattern: &str, action: Action) -> Self {
        Self {
            method,
            pattern: normalize_path(pattern).to_string(),
            action,
        }
    }

    /// Literal comparison of normalized paths. There are no wildcards and the query string is
    /// not parsed: `?cursor=` is part of some patterns. See [`RouteTable::find`] for how other
    /// query strings are handled.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        &self.method == method && self.pattern == normalize_path(path)
    }
}

/// Every endpoint the stub knows about, checked in registration order.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The endpoints of the fake API, with the organization, project and release taken from
    /// `scope`.
    pub fn for_scope(scope: &ApiScope) -> Self {
        let ApiScope {
            org,
            project,
            version,
            ..
        } = scope;
        let release = scope.release();

        let routes = vec![
            Route::new(Method::HEAD, "_check", Action::Alive),
            // GET
            Route::new(Method::GET, "STOP", Action::Stop),
            Route::new(
                Method::GET,
                "api/0",
                Action::Json(r#"{"version":"0","auth":null,"user":null}"#),
            ),
            Route::new(
                Method::GET,
                &format!("api/0/organizations/{}/chunk-upload/", org),
                Action::ChunkUploadConfig,
            ),
            Route::new(
                Method::GET,
                &format!("api/0/organizations/{}/repos/?cursor=", org),
                Action::Fixture("repos.json"),
            ),
            Route::new(
                Method::GET,
                &format!(
                    "api/0/organizations/{}/releases/{}/previous-with-commits/",
                    org, release
                ),
                Action::Json("{}"),
            ),
            Route::new(
                Method::GET,
                &format!(
                    "api/0/projects/{}/{}/releases/{}/files/?cursor=",
                    org, project, version
                ),
                Action::Fixture("artifacts.json"),
            ),
            // POST
            Route::new(
                Method::POST,
                &format!("api/0/projects/{}/{}/files/difs/assemble/", org, project),
                Action::DifsAssemble,
            ),
            Route::new(
                Method::POST,
                &format!("api/0/projects/{}/{}/releases/", org, project),
                Action::Fixture("release.json"),
            ),
            Route::new(
                Method::POST,
                &format!("api/0/organizations/{}/releases/{}/deploys/", org, release),
                Action::Fixture("deploy.json"),
            ),
            Route::new(
                Method::POST,
                &format!(
                    "api/0/projects/{}/{}/releases/{}/files/",
                    org, project, release
                ),
                Action::Fixture("artifact.json"),
            ),
            Route::new(
                Method::POST,
                &format!("api/0/organizations/{}/releases/{}/assemble/", org, version),
                Action::Json(r#"{"state":"ok","missingChunks":[],"detail":null}"#),
            ),
            Route::new(
                Method::POST,
                &format!("api/0/projects/{}/{}/files/dsyms/", org, project),
                Action::Fixture("debug-info-files.json"),
            ),
            Route::new(
                Method::POST,
                &format!("api/0/projects/{}/{}/files/dsyms/associate/", org, project),
                Action::Fixture("associate-dsyms.json"),
            ),
            Route::new(
                Method::POST,
                &format!("api/0/projects/{}/{}/reprocessing/", org, project),
                Action::Json("{}"),
            ),
            Route::new(
                Method::POST,
                &format!("api/0/organizations/{}/chunk-upload/", org),
                Action::Json("{}"),
            ),
            Route::new(Method::POST, "api/0/envelope", Action::Envelope),
            // PUT
            Route::new(
                Method::PUT,
                &format!("api/0/organizations/{}/releases/{}/", org, release),
                Action::Fixture("release.json"),
            ),
            Route::new(
                Method::PUT,
                &format!("api/0/projects/{}/{}/releases/{}/", org, project, release),
                Action::Fixture("release.json"),
            ),
        ];

        Self::new(routes)
    }

    /// The first route registered for `method` whose pattern equals the normalized `path`.
    ///
    /// The full target is tried first, so patterns carrying a query marker (`?cursor=`) match
    /// literally. Failing that, the query string is dropped and the bare path is tried.
    pub fn find(&self, method: &Method, path: &str) -> Option<&Route> {
        self.find_exact(method, path).or_else(|| {
            let (bare, _query) = path.split_once('?')?;
            self.find_exact(method, bare)
        })
    }

    fn find_exact(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(method, path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::for_scope(&ApiScope::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn method_and_pattern_pairs_are_unique() {
        let table = RouteTable::default();
        let unique: HashSet<_> = table
            .iter()
            .map(|route| (route.method.clone(), route.pattern.clone()))
            .collect();
        assert_eq!(unique.len(), table.len());
    }

    #[test]
    fn surrounding_slashes_do_not_matter() {
        let table = RouteTable::default();
        for path in ["api/0", "/api/0", "/api/0/", "api/0/", "//api/0//"] {
            let route = table.find(&Method::GET, path).unwrap();
            assert_eq!(route.pattern, "api/0");
        }
    }

    #[test]
    fn routes_are_bound_to_their_method() {
        let table = RouteTable::default();
        assert!(table.find(&Method::POST, "/api/0").is_none());
        assert!(table.find(&Method::GET, "/_check").is_none());
        assert_eq!(
            table.find(&Method::HEAD, "/_check").unwrap().action,
            Action::Alive
        );

        // Registered under both GET and POST with different behaviour.
        let path = "/api/0/organizations/org/chunk-upload/";
        assert_eq!(
            table.find(&Method::GET, path).unwrap().action,
            Action::ChunkUploadConfig
        );
        assert_eq!(
            table.find(&Method::POST, path).unwrap().action,
            Action::Json("{}")
        );
    }

    #[test]
    fn there_is_no_prefix_matching() {
        let table = RouteTable::default();
        assert!(table.find(&Method::GET, "/api").is_none());
        assert!(table.find(&Method::GET, "/api/0/extra").is_none());
        assert!(table
            .find(&Method::GET, "/api/0/organizations/org/repos/")
            .is_none());
        assert!(table
            .find(&Method::GET, "/api/0/organizations/org/repos/?cursor=abc")
            .is_none());
    }

    #[test]
    fn query_strings_fall_back_to_the_bare_path() {
        let table = RouteTable::default();
        let route = table
            .find(&Method::GET, "/api/0/organizations/org/chunk-upload/?foo=bar")
            .unwrap();
        assert_eq!(route.action, Action::ChunkUploadConfig);
        assert_eq!(
            table.find(&Method::GET, "/api/0?x=1").unwrap().pattern,
            "api/0"
        );

        // Literal query patterns still win over the fallback.
        assert_eq!(
            table
                .find(&Method::GET, "/api/0/organizations/org/repos/?cursor=")
                .unwrap()
                .action,
            Action::Fixture("repos.json")
        );
        // The fallback does not cross methods.
        assert!(table.find(&Method::PUT, "/api/0?x=1").is_none());
    }

    #[test]
    fn scope_values_end_up_in_the_patterns() {
        let scope = ApiScope {
            org: "acme".to_string(),
            project: "rocket".to_string(),
            app: "launcher".to_string(),
            version: "2.0".to_string(),
        };
        let table = RouteTable::for_scope(&scope);

        assert!(table
            .find(&Method::PUT, "/api/0/projects/acme/rocket/releases/launcher@2.0/")
            .is_some());
        assert!(table
            .find(&Method::PUT, "/api/0/projects/org/project/releases/app@1.1.0/")
            .is_none());
    }

    #[test]
    fn first_registered_route_wins() {
        let table = RouteTable::new(vec![
            Route::new(Method::GET, "/same/", Action::Json("1")),
            Route::new(Method::GET, "same", Action::Json("2")),
        ]);
        assert_eq!(
            table.find(&Method::GET, "same").unwrap().action,
            Action::Json("1")
        );
    }
}
