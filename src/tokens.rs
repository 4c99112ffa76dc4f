//! Stable type identifiers ("tokens") for bridged resources and data sources.
//!
//! A token has the text form `<package>:<module>:<name>`, for example
//! `gcp:compute/autoscaler:Autoscaler`. The module part may itself contain
//! `/`. Tokens are compared structurally; the decomposition is only used to
//! render human-readable deprecation messages.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Behavior shared by resource and data source tokens.
pub trait Token:
    Clone + Eq + Ord + fmt::Debug + fmt::Display + Serialize + DeserializeOwned
{
    /// The full token text.
    fn as_str(&self) -> &str;

    /// The package (provider) part of the token.
    fn package(&self) -> &str {
        split(self.as_str()).0
    }

    /// The module part of the token, without the package.
    fn module_name(&self) -> &str {
        split(self.as_str()).1
    }

    /// The member name of the token.
    fn name(&self) -> &str {
        split(self.as_str()).2
    }

    /// The dotted form used in documentation, e.g. `gcp.compute/autoscaler.Autoscaler`.
    ///
    /// The module is lowercased, and dropped entirely when it is `index`.
    fn readable(&self) -> String {
        readable_name(self.package(), &self.module_name().to_lowercase(), self.name())
    }
}

/// Token of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceToken(String);

/// Token of a data source (a provider function).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSourceToken(String);

impl ResourceToken {
    /// Wrap an existing token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Assemble a token from its parts.
    pub fn from_parts(package: &str, module: &str, name: &str) -> Self {
        Self(format!("{}:{}:{}", package, module, name))
    }
}

impl DataSourceToken {
    /// Wrap an existing token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Assemble a token from its parts.
    pub fn from_parts(package: &str, module: &str, name: &str) -> Self {
        Self(format!("{}:{}:{}", package, module, name))
    }
}

impl Token for ResourceToken {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl Token for DataSourceToken {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DataSourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&str> for DataSourceToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Split a token into `(package, module, name)`.
///
/// Missing parts come back empty: `"Name"` has only a name and
/// `"pkg:Name"` has no module.
fn split(token: &str) -> (&str, &str, &str) {
    let Some((package, rest)) = token.split_once(':') else {
        return ("", "", token);
    };
    match rest.rsplit_once(':') {
        Some((module, name)) => (package, module, name),
        None => (package, "", rest),
    }
}

/// Render `package.module.member`, omitting an empty or `index` module.
pub fn readable_name(package: &str, module: &str, member: &str) -> String {
    if module.is_empty() || module == "index" {
        format!("{}.{}", package, member)
    } else {
        format!("{}.{}.{}", package, module, member)
    }
}
