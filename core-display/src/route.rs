//! Route classification.
//!
//! Paths are compared after stripping the query and fragment and dropping a
//! trailing slash (`/` itself is kept).

use core_runtime::config::RouteConfig;

/// How a route affects the display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// The listing route; the player shows as the mini bar.
    Home,
    /// A track detail page, which renders its own full player.
    Detail,
    /// Everything else; the player floats.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteClassifier {
    home_path: String,
    detail_prefix: String,
}

impl RouteClassifier {
    /// A detail prefix missing its trailing `/` is matched as if it had one,
    /// so `/podcasts` never claims `/podcastsx`.
    pub fn new(routes: &RouteConfig) -> Self {
        let mut detail_prefix = routes.detail_prefix.clone();
        if !detail_prefix.ends_with('/') {
            detail_prefix.push('/');
        }

        Self {
            home_path: normalize_path(&routes.home_path).to_string(),
            detail_prefix,
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_path(path);

        if path == self.home_path {
            return RouteClass::Home;
        }

        match path.strip_prefix(self.detail_prefix.as_str()) {
            Some(rest) if !rest.is_empty() => RouteClass::Detail,
            _ => RouteClass::Other,
        }
    }

    pub fn is_detail(&self, path: &str) -> bool {
        self.classify(path) == RouteClass::Detail
    }
}

impl Default for RouteClassifier {
    fn default() -> Self {
        Self::new(&RouteConfig::default())
    }
}

/// Strip query, fragment and trailing slash.
///
/// ```
/// use core_display::route::normalize_path;
///
/// assert_eq!(normalize_path("/podcasts/?page=2#top"), "/podcasts");
/// assert_eq!(normalize_path("/"), "/");
/// ```
pub fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
