//! Platform naming as understood by the Disco API.

/// Operating system, architecture and packaging of the JDK to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// `linux`, `macos` or `windows`.
    pub os: &'static str,
    /// `x32`, `x64` or `aarch64`.
    pub arch: &'static str,
    /// `32` for `x32`, `64` otherwise.
    pub bitness: &'static str,
    /// C library the JDK is linked against.
    pub libc_type: &'static str,
    /// `zip` on windows, `tar.gz` elsewhere.
    pub archive_type: &'static str,
}

impl Platform {
    /// The platform this binary runs on.
    pub fn current() -> Self {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map free-form OS and architecture names to Disco API values.
    pub fn from_names(os_name: &str, arch_name: &str) -> Self {
        let os = os_from_name(os_name);
        let arch = arch_from_name(arch_name);
        Self {
            os,
            arch,
            bitness: if arch == "x32" { "32" } else { "64" },
            libc_type: match os {
                "linux" => "glibc",
                "windows" => "c_std_lib",
                "macos" => "libc",
                _ => "",
            },
            archive_type: if os == "windows" { "zip" } else { "tar.gz" },
        }
    }
}

fn os_from_name(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("mac") {
        "macos"
    } else if name.contains("windows") {
        "windows"
    } else {
        "linux"
    }
}

fn arch_from_name(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("x86_32") || name.contains("amd32") || matches!(name.as_str(), "x86" | "i386" | "i686") {
        "x32"
    } else if name.contains("aarch64") || name.contains("arm64") {
        "aarch64"
    } else {
        "x64"
    }
}
