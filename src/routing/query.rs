//! Query string parsing
//!
//! Decodes `application/x-www-form-urlencoded` query strings into a
//! multi-valued parameter map owned by a single request.

use std::collections::HashMap;

/// Query parameters of one request, name -> values in arrival order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    values: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`)
    ///
    /// `+` decodes to a space and `%XX` escapes are decoded. Parameters with
    /// blank values are dropped, so `id=` reads the same as a missing `id`.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        let Some(raw) = raw else {
            return Self { values };
        };

        for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            values
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { values }
    }

    /// First value for `name`
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }
}
