//! Blocking client for the foojay Disco API.
//!
//! Resolving a download takes two requests: a package search narrowed to a
//! single GA build for the platform, then the package-info link of the first
//! hit, which carries the direct download URI.

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform::Platform;
use crate::config::ProxyConfig;
use crate::error::Result;
use crate::providers::JdkRequest;

/// Public Disco API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.foojay.io/disco/v3.0";

const API_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where to fetch a JDK archive from and what to call it on disk.
///
/// The file name doubles as the download cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    /// Direct download URI.
    pub source_url: String,
    /// Archive file name.
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
struct PackagesResponse {
    result: Vec<PackageEntry>,
}

#[derive(Debug, Deserialize)]
struct PackageEntry {
    filename: String,
    links: PackageLinks,
}

#[derive(Debug, Deserialize)]
struct PackageLinks {
    pkg_info_uri: String,
}

#[derive(Debug, Deserialize)]
struct PackageInfoResponse {
    result: Vec<PackageInfo>,
}

#[derive(Debug, Deserialize)]
struct PackageInfo {
    direct_download_uri: String,
}

/// Talks to the Disco API and downloads archives.
pub struct DiscoClient {
    client: Client,
    base_url: String,
}

impl DiscoClient {
    /// Create a client for `base_url`, optionally routed through a proxy.
    pub fn new(base_url: &str, proxy: Option<&ProxyConfig>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("toolchain-installer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT);

        if let Some(proxy) = proxy {
            tracing::debug!("Using proxy {}", proxy.url());
            let mut settings = reqwest::Proxy::all(proxy.url())?;
            if let Some(username) = &proxy.username {
                settings = settings.basic_auth(username, proxy.password.as_deref().unwrap_or(""));
            }
            builder = builder.proxy(settings);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search URL for the newest GA JDK package matching `request`.
    pub fn packages_url(&self, request: &JdkRequest, platform: &Platform) -> anyhow::Result<Url> {
        let params = [
            ("distribution", request.vendor.as_str()),
            ("version", request.version.as_str()),
            ("operating_system", platform.os),
            ("architecture", platform.arch),
            ("bitness", platform.bitness),
            ("archive_type", platform.archive_type),
            ("libc_type", platform.libc_type),
            ("latest", "overall"),
            ("package_type", "jdk"),
            ("discovery_scope_id", "directly_downloadable"),
            ("match", "any"),
            ("javafx_bundled", "false"),
            ("directly_downloadable", "true"),
            ("release_status", "ga"),
        ];
        let base = format!("{}/packages", self.base_url);
        Url::parse_with_params(&base, &params).with_context(|| format!("Invalid API URL {}", base))
    }

    /// Resolve the archive to download for `request`.
    pub fn resolve(
        &self,
        request: &JdkRequest,
        platform: &Platform,
    ) -> anyhow::Result<ArchiveDescriptor> {
        let query_url = self.packages_url(request, platform)?;
        tracing::debug!("Querying {}", query_url);

        let packages: PackagesResponse = self
            .get_json(query_url.as_str())
            .with_context(|| format!("Error parsing response from {}", query_url))?;
        let package = packages
            .result
            .into_iter()
            .next()
            .with_context(|| format!("No package found by {}", query_url))?;

        let info: PackageInfoResponse = self
            .get_json(&package.links.pkg_info_uri)
            .with_context(|| format!("Error parsing response from {}", query_url))?;
        let info = info.result.into_iter().next().with_context(|| {
            format!("No package info at {}", package.links.pkg_info_uri)
        })?;

        Ok(ArchiveDescriptor {
            source_url: info.direct_download_uri,
            file_name: package.filename,
        })
    }

    /// Download the archive into `dest_dir` unless a file of the same name
    /// is already there.
    ///
    /// Data is streamed to a `.part` file that is renamed once complete.
    pub fn download(
        &self,
        descriptor: &ArchiveDescriptor,
        dest_dir: &Path,
        show_progress: bool,
    ) -> anyhow::Result<PathBuf> {
        let target = dest_dir.join(&descriptor.file_name);
        if target.exists() {
            tracing::debug!("Using cached archive {}", target.display());
            return Ok(target);
        }

        tracing::debug!("Downloading {}", descriptor.source_url);
        let response = self
            .client
            .get(&descriptor.source_url)
            .send()
            .with_context(|| format!("Failed to fetch {}", descriptor.source_url))?;
        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), descriptor.source_url);
        }

        let bar = progress_bar(show_progress, response.content_length(), &descriptor.file_name);
        let partial = dest_dir.join(format!("{}.part", descriptor.file_name));
        let mut file = File::create(&partial)
            .with_context(|| format!("Failed to create {}", partial.display()))?;

        let copied = io::copy(&mut bar.wrap_read(response), &mut file);
        bar.finish_and_clear();
        drop(file);
        if let Err(e) = copied {
            let _ = fs::remove_file(&partial);
            return Err(e).with_context(|| format!("Failed to download {}", descriptor.source_url));
        }

        fs::rename(&partial, &target)
            .with_context(|| format!("Failed to move {} into place", partial.display()))?;
        Ok(target)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let response = self
            .client
            .get(url)
            .timeout(API_TIMEOUT)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        response
            .json()
            .with_context(|| format!("Unexpected response shape from {}", url))
    }
}

fn progress_bar(visible: bool, length: Option<u64>, name: &str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = match length {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:30.magenta}] {bytes}/{total_bytes} ({eta})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(name.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn request() -> JdkRequest {
        JdkRequest::new("17", "temurin")
    }

    fn linux() -> Platform {
        Platform::from_names("linux", "x86_64")
    }

    #[test]
    fn packages_url_encodes_all_filters() {
        let client = DiscoClient::new("https://api.example.com/disco/v3.0/", None).unwrap();
        let url = client.packages_url(&request(), &linux()).unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| {
            query
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(url.path(), "/disco/v3.0/packages");
        assert_eq!(get("distribution"), Some("temurin"));
        assert_eq!(get("version"), Some("17"));
        assert_eq!(get("operating_system"), Some("linux"));
        assert_eq!(get("architecture"), Some("x64"));
        assert_eq!(get("bitness"), Some("64"));
        assert_eq!(get("archive_type"), Some("tar.gz"));
        assert_eq!(get("libc_type"), Some("glibc"));
        assert_eq!(get("latest"), Some("overall"));
        assert_eq!(get("package_type"), Some("jdk"));
        assert_eq!(get("javafx_bundled"), Some("false"));
        assert_eq!(get("directly_downloadable"), Some("true"));
        assert_eq!(get("release_status"), Some("ga"));
    }

    #[test]
    fn resolve_follows_package_info_link() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/packages")
                .query_param("distribution", "temurin")
                .query_param("version", "17");
            then.status(200).json_body(serde_json::json!({
                "result": [{
                    "filename": "OpenJDK17U-jdk_x64_linux.tar.gz",
                    "links": { "pkg_info_uri": server.url("/ids/abc") }
                }]
            }));
        });
        let info = server.mock(|when, then| {
            when.method(GET).path("/ids/abc");
            then.status(200).json_body(serde_json::json!({
                "result": [{ "direct_download_uri": "https://cdn.example.com/jdk.tar.gz" }]
            }));
        });

        let client = DiscoClient::new(&server.base_url(), None).unwrap();
        let descriptor = client.resolve(&request(), &linux()).unwrap();

        search.assert();
        info.assert();
        assert_eq!(descriptor.file_name, "OpenJDK17U-jdk_x64_linux.tar.gz");
        assert_eq!(descriptor.source_url, "https://cdn.example.com/jdk.tar.gz");
    }

    #[test]
    fn empty_result_is_an_error_naming_the_query() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/packages");
            then.status(200).json_body(serde_json::json!({ "result": [] }));
        });

        let client = DiscoClient::new(&server.base_url(), None).unwrap();
        let err = client.resolve(&request(), &linux()).unwrap_err();
        assert!(format!("{:#}", err).contains("/packages?distribution=temurin"));
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/packages");
            then.status(200).json_body(serde_json::json!({ "result": "nope" }));
        });

        let client = DiscoClient::new(&server.base_url(), None).unwrap();
        assert!(client.resolve(&request(), &linux()).is_err());
    }

    #[test]
    fn http_error_status_aborts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/packages");
            then.status(503);
        });

        let client = DiscoClient::new(&server.base_url(), None).unwrap();
        let err = client.resolve(&request(), &linux()).unwrap_err();
        assert!(format!("{:#}", err).contains("503"));
    }

    #[test]
    fn download_writes_file_and_skips_when_cached() {
        let server = MockServer::start();
        let file = server.mock(|when, then| {
            when.method(GET).path("/jdk.tar.gz");
            then.status(200).body("archive-bytes");
        });
        let temp = TempDir::new().unwrap();
        let client = DiscoClient::new(&server.base_url(), None).unwrap();
        let descriptor = ArchiveDescriptor {
            source_url: server.url("/jdk.tar.gz"),
            file_name: "jdk.tar.gz".to_string(),
        };

        let path = client.download(&descriptor, temp.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "archive-bytes");
        assert!(!temp.path().join("jdk.tar.gz.part").exists());

        client.download(&descriptor, temp.path(), false).unwrap();
        file.assert_calls(1);
    }

    #[test]
    fn failed_download_leaves_no_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/jdk.zip");
            then.status(404);
        });
        let temp = TempDir::new().unwrap();
        let client = DiscoClient::new(&server.base_url(), None).unwrap();
        let descriptor = ArchiveDescriptor {
            source_url: server.url("/jdk.zip"),
            file_name: "jdk.zip".to_string(),
        };

        assert!(client.download(&descriptor, temp.path(), false).is_err());
        assert!(!temp.path().join("jdk.zip").exists());
    }

    #[test]
    fn proxy_with_credentials_builds_client() {
        let proxy = ProxyConfig {
            host: "proxy.internal".to_string(),
            port: 3128,
            protocol: "http".to_string(),
            username: Some("build".to_string()),
            password: None,
        };
        assert!(DiscoClient::new(DEFAULT_BASE_URL, Some(&proxy)).is_ok());
    }
}
