//! Declared toolchain requirements.

use std::collections::BTreeMap;
use std::fmt;

/// Kind of a JDK toolchain in the registry.
pub const JDK_KIND: &str = "jdk";

/// Kind used by projects for the JDK that runs their tests.
///
/// It is resolved exactly like [`JDK_KIND`].
pub const TEST_JDK_KIND: &str = "testJdk";

/// A caller-declared need for a toolchain of a given kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainRequirement {
    /// Toolchain kind as declared (e.g. "jdk", "testJdk").
    pub kind: String,
    /// Required `provides` values, commonly `version` and `vendor`.
    pub params: BTreeMap<String, String>,
}

impl ToolchainRequirement {
    /// Create a requirement.
    pub fn new(kind: impl Into<String>, params: BTreeMap<String, String>) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }

    /// The kind used to look up and acquire this requirement.
    ///
    /// `testJdk` requirements are satisfied by `jdk` toolchains.
    pub fn normalized_kind(&self) -> &str {
        if self.kind == TEST_JDK_KIND {
            JDK_KIND
        } else {
            &self.kind
        }
    }

    /// Whether this requirement can be acquired by the JDK providers.
    pub fn is_jdk(&self) -> bool {
        self.normalized_kind().eq_ignore_ascii_case(JDK_KIND)
    }

    /// Look up a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Requested version, if any.
    pub fn version(&self) -> Option<&str> {
        self.param("version")
    }

    /// Requested vendor, if any.
    pub fn vendor(&self) -> Option<&str> {
        self.param("vendor")
    }
}

impl fmt::Display for ToolchainRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.kind)?;
        if self.params.is_empty() {
            write!(f, " any")?;
        }
        for (key, value) in &self.params {
            write!(f, " {} = '{}'", key, value)?;
        }
        write!(f, " ]")
    }
}
