//! Absolute link construction for pagination and deep links.
//!
//! # Invariants
//! - A `RequestUrl` is never mutated; overrides produce copies.
//! - Scheme and host always come from the serving request.

use crate::query::params::QueryParams;
use url::Url;

/// Absolute URL of the request being served, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    scheme: String,
    /// Host with optional `:port`.
    host: String,
    path: String,
    params: QueryParams,
}

impl RequestUrl {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
            params: QueryParams::new(),
        }
    }

    /// Parses an absolute URL such as `https://example.org/categories?offset=5`.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            path: url.path().to_string(),
            params: url.query().map(QueryParams::parse).unwrap_or_default(),
        })
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Copy of this URL with one query parameter overridden.
    pub fn with_param(&self, key: &str, value: impl Into<String>) -> Self {
        Self {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            path: self.path.clone(),
            params: self.params.with(key, value),
        }
    }

    /// URL on the same scheme and host with a different path and query.
    pub fn sibling(&self, path: &str, params: QueryParams) -> Self {
        Self {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            path: path.to_string(),
            params,
        }
    }

    pub fn to_url(&self) -> String {
        let mut rendered = format!("{}://{}{}", self.scheme, self.host, self.path);
        if !self.params.is_empty() {
            rendered.push('?');
            rendered.push_str(&self.params.encode());
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::RequestUrl;
    use crate::query::params::QueryParams;

    #[test]
    fn parse_keeps_port_path_and_query() {
        let url = RequestUrl::parse("http://localhost:8000/categories?offset=5&lang=en").unwrap();
        assert_eq!(url.params().get("offset"), Some("5"));
        assert_eq!(
            url.to_url(),
            "http://localhost:8000/categories?offset=5&lang=en"
        );
    }

    #[test]
    fn with_param_echoes_other_parameters() {
        let url = RequestUrl::parse("https://example.org/categories?lang=en&offset=0").unwrap();
        let next = url.with_param("offset", "5");

        assert_eq!(next.to_url(), "https://example.org/categories?lang=en&offset=5");
        assert_eq!(url.params().get("offset"), Some("0"));
    }

    #[test]
    fn sibling_reuses_scheme_and_host() {
        let url = RequestUrl::new("https", "example.org", "/categories");
        let params: QueryParams = [("topic", "Sea Stories")].into_iter().collect();
        assert_eq!(
            url.sibling("/books", params).to_url(),
            "https://example.org/books?topic=Sea+Stories"
        );
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        let url = RequestUrl::new("http", "example.org", "/books");
        assert_eq!(url.to_url(), "http://example.org/books");
    }

    #[test]
    fn relative_input_is_rejected() {
        assert!(RequestUrl::parse("/books?page=2").is_err());
    }
}
