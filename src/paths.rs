/// Path prefixes reachable without a session.
pub const DEFAULT_PUBLIC_PREFIXES: &[&str] = &["/login", "/signin", "/api/auth"];

/// Path prefixes the gate never looks at (bundled assets, images, favicon).
pub const DEFAULT_STATIC_PREFIXES: &[&str] = &["/static", "/images", "/favicon.ico"];

/// Returns true if `path` is `prefix` itself or lies below it.
///
/// Matching is per segment: `/login` covers `/login` and `/login/reset`,
/// but not `/loginx`.
#[must_use]
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Static classification of request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRules {
    public_prefixes: Vec<String>,
    static_prefixes: Vec<String>,
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            public_prefixes: DEFAULT_PUBLIC_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            static_prefixes: DEFAULT_STATIC_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl PathRules {
    #[must_use]
    pub fn new(public_prefixes: Vec<String>, static_prefixes: Vec<String>) -> Self {
        Self {
            public_prefixes,
            static_prefixes,
        }
    }

    /// Add a public prefix if it is not already listed.
    #[must_use]
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !self.public_prefixes.contains(&prefix) {
            self.public_prefixes.push(prefix);
        }
        self
    }

    /// Add a static-asset prefix if it is not already listed.
    #[must_use]
    pub fn with_static_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !self.static_prefixes.contains(&prefix) {
            self.static_prefixes.push(prefix);
        }
        self
    }

    /// Whether `path` may be served without a session.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| matches_prefix(path, p))
    }

    /// Whether `path` is a static asset the gate skips entirely.
    #[must_use]
    pub fn is_static_asset(&self, path: &str) -> bool {
        self.static_prefixes.iter().any(|p| matches_prefix(path, p))
    }

    #[must_use]
    pub fn public_prefixes(&self) -> &[String] {
        &self.public_prefixes
    }

    #[must_use]
    pub fn static_prefixes(&self) -> &[String] {
        &self.static_prefixes
    }
}
