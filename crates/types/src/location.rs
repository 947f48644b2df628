//! Viewer addresses of the form `/ui/?id={id}`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Path the viewer is served from.
pub const VIEWER_PATH: &str = "/ui/";

// Only used to give relative locations something to resolve against.
const PLACEHOLDER_ORIGIN: &str = "http://flowdeck.invalid";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("invalid location '{0}': {1}")]
    Malformed(String, String),
    #[error("location '{0}' has no `id` query parameter")]
    MissingId(String),
}

/// Identifies the workflow instance being viewed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewerLocation {
    id: String,
}

impl ViewerLocation {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parses `/ui/?id=1`, `?id=1`, `id=1` or an absolute URL.
    ///
    /// The first non-empty `id` query parameter wins.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let trimmed = input.trim();
        let candidate = if trimmed.starts_with('/') || trimmed.starts_with('?') || trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("?{trimmed}")
        };
        let base = Url::parse(PLACEHOLDER_ORIGIN).map_err(|error| LocationError::Malformed(input.to_string(), error.to_string()))?;
        let url = base
            .join(&candidate)
            .map_err(|error| LocationError::Malformed(input.to_string(), error.to_string()))?;
        url.query_pairs()
            .find(|(key, value)| key == "id" && !value.is_empty())
            .map(|(_, value)| Self::new(value.into_owned()))
            .ok_or_else(|| LocationError::MissingId(input.to_string()))
    }
}

impl fmt::Display for ViewerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded: String = url::form_urlencoded::byte_serialize(self.id.as_bytes()).collect();
        write!(f, "{VIEWER_PATH}?id={encoded}")
    }
}

impl FromStr for ViewerLocation {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relative_and_absolute_locations() {
        assert_eq!(ViewerLocation::parse("/ui/?id=123").unwrap().id(), "123");
        assert_eq!(ViewerLocation::parse("?id=abc&x=1").unwrap().id(), "abc");
        assert_eq!(ViewerLocation::parse("id=7").unwrap().id(), "7");
        assert_eq!(
            ViewerLocation::parse("https://pizza.example.com/ui/?foo=bar&id=99").unwrap().id(),
            "99"
        );
    }

    #[test]
    fn missing_id_is_an_error() {
        assert_eq!(
            ViewerLocation::parse("/ui/?foo=bar"),
            Err(LocationError::MissingId("/ui/?foo=bar".into()))
        );
        assert!(matches!(ViewerLocation::parse("/ui/?id="), Err(LocationError::MissingId(_))));
    }

    #[test]
    fn renders_viewer_path() {
        assert_eq!(ViewerLocation::new("12345").to_string(), "/ui/?id=12345");
        let odd = ViewerLocation::new("a b&c");
        assert_eq!(ViewerLocation::parse(&odd.to_string()).unwrap(), odd);
    }
}
