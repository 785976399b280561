//! Resolved network address of an addressable resource

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Network endpoint published in a resource's status
///
/// Serialized as a single URL string (`http://host/path`) so it reads the
/// same way in `kubectl get -o yaml` as any other addressable resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    scheme: String,
    host: String,
    /// Always empty or starting with `/`
    path: String,
}

impl Address {
    /// Create an `http` address for the given host
    pub fn http(host: impl Into<String>) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            path: String::new(),
        }
    }

    /// Return a copy of this address with the given path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.is_empty() || path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    /// URL scheme (`http` or `https`)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host, optionally with port
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path, empty or starting with `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parse a `scheme://host[/path]` string
    pub fn parse(s: &str) -> crate::Result<Self> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| crate::Error::validation(format!("address {s:?} has no scheme")))?;
        if scheme.is_empty() {
            return Err(crate::Error::validation(format!(
                "address {s:?} has an empty scheme"
            )));
        }
        let (host, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        if host.is_empty() {
            return Err(crate::Error::validation(format!(
                "address {s:?} has an empty host"
            )));
        }
        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            path: path.to_string(),
        })
    }
}

impl JsonSchema for Address {
    fn schema_name() -> String {
        "Address".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.path)
    }
}

impl std::str::FromStr for Address {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}
