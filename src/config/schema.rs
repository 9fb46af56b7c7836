//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the
//! `toolchains.yml` file format.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::toolchain::ToolchainRequirement;

/// Root configuration structure for `toolchains.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Skip the whole run (overridden by `TOOLCHAIN_INSTALLER_SKIP`).
    pub skip: bool,

    /// Where downloaded JDKs are unpacked (default `~/.m2/jdks`).
    pub jdks_dir: Option<PathBuf>,

    /// Registry document (default `~/.m2/toolchains.xml`).
    pub registry: Option<PathBuf>,

    /// Disco API base URL.
    pub disco_api: Option<String>,

    /// HTTP proxy for API calls and downloads.
    pub proxy: Option<ProxyConfig>,

    /// Required toolchains, by kind, in declaration order.
    pub toolchains: RequirementSet,
}

/// Proxy settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyConfig {
    /// Proxy host name.
    pub host: String,

    /// Proxy port.
    pub port: u16,

    /// Proxy scheme.
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Basic-auth user.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_protocol() -> String {
    "http".to_string()
}

impl ProxyConfig {
    /// Proxy URL without credentials.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Ordered toolchain requirements.
///
/// Deserialized from a mapping of kind to parameters. Scalar parameter
/// values are kept as strings, so `version: 17` means `"17"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet(pub Vec<ToolchainRequirement>);

impl RequirementSet {
    /// Requirements in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolchainRequirement> {
        self.0.iter()
    }

    /// Number of requirements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no toolchain is required.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Requirements as a slice.
    pub fn as_slice(&self) -> &[ToolchainRequirement] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RequirementSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RequirementSetVisitor)
    }
}

struct RequirementSetVisitor;

impl<'de> Visitor<'de> for RequirementSetVisitor {
    type Value = RequirementSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of toolchain kinds to parameters")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RequirementSet::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut requirements: Vec<ToolchainRequirement> = Vec::new();
        while let Some((kind, params)) =
            map.next_entry::<String, Option<BTreeMap<String, serde_yaml::Value>>>()?
        {
            if requirements.iter().any(|r| r.kind == kind) {
                return Err(de::Error::custom(format!(
                    "duplicate toolchain kind '{}'",
                    kind
                )));
            }
            let mut resolved = BTreeMap::new();
            for (key, value) in params.unwrap_or_default() {
                let value = scalar_to_string(&value).ok_or_else(|| {
                    de::Error::custom(format!(
                        "parameter '{}' of toolchain '{}' must be a scalar",
                        key, kind
                    ))
                })?;
                resolved.insert(key, value);
            }
            requirements.push(ToolchainRequirement::new(kind, resolved));
        }
        Ok(RequirementSet(requirements))
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> InstallerConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn parses_full_config() {
        let config = parse(
            r#"
skip: true
jdks_dir: /opt/jdks
registry: /tmp/toolchains.xml
disco_api: http://localhost:9999
proxy:
  host: proxy.internal
  port: 3128
  username: build
  password: secret
toolchains:
  jdk:
    version: "17"
    vendor: temurin
"#,
        );
        assert!(config.skip);
        assert_eq!(config.jdks_dir, Some(PathBuf::from("/opt/jdks")));
        assert_eq!(config.registry, Some(PathBuf::from("/tmp/toolchains.xml")));
        assert_eq!(config.disco_api.as_deref(), Some("http://localhost:9999"));

        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.protocol, "http");
        assert_eq!(proxy.url(), "http://proxy.internal:3128");
        assert_eq!(proxy.username.as_deref(), Some("build"));

        assert_eq!(config.toolchains.len(), 1);
        let jdk = &config.toolchains.as_slice()[0];
        assert_eq!(jdk.kind, "jdk");
        assert_eq!(jdk.version(), Some("17"));
        assert_eq!(jdk.vendor(), Some("temurin"));
    }

    #[test]
    fn keeps_declaration_order() {
        let config = parse(
            r#"
toolchains:
  testJdk:
    version: "21"
  jdk:
    version: "17"
"#,
        );
        let kinds: Vec<&str> = config.toolchains.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["testJdk", "jdk"]);
    }

    #[test]
    fn numeric_versions_become_strings() {
        let config = parse("toolchains:\n  jdk:\n    version: 17\n  testJdk:\n    version: 1.8\n");
        assert_eq!(config.toolchains.as_slice()[0].version(), Some("17"));
        assert_eq!(config.toolchains.as_slice()[1].version(), Some("1.8"));
    }

    #[test]
    fn toolchain_without_params() {
        let config = parse("toolchains:\n  jdk:\n");
        let jdk = &config.toolchains.as_slice()[0];
        assert!(jdk.params.is_empty());
    }

    #[test]
    fn empty_toolchains_section() {
        let config = parse("toolchains:\n");
        assert!(config.toolchains.is_empty());
        assert!(!config.skip);
    }

    #[test]
    fn nested_param_is_rejected() {
        let result: Result<InstallerConfig, _> =
            serde_yaml::from_str("toolchains:\n  jdk:\n    version: [17, 21]\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("must be a scalar"));
    }

    #[test]
    fn repeated_kind_is_rejected() {
        let result: Result<InstallerConfig, _> = serde_yaml::from_str(
            "toolchains:\n  jdk:\n    version: '17'\n  jdk:\n    version: '21'\n",
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate"));
        assert!(err.contains("jdk"));
    }
}
