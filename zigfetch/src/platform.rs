use crate::extension::Extension;
use std::env::consts;
use strum::{Display, EnumIter};
use thiserror::Error;

/// The error returned when the host is not one of the platforms the Zig
/// build index publishes archives for.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),
    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),
}

/// An operating system the build index publishes archives for. The
/// `Display` strings match the names used in the index's file names.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
pub enum Os {
    #[strum(serialize = "windows")]
    Windows,
    #[strum(serialize = "linux")]
    Linux,
    #[strum(serialize = "macos")]
    MacOS,
}

/// A CPU architecture the build index publishes archives for.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
pub enum Arch {
    #[strum(serialize = "x86_64")]
    X86_64,
    #[strum(serialize = "aarch64")]
    Aarch64,
}

/// The platform to download a build for. This is resolved once at startup
/// and is immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Platform {
    os: Os,
    arch: Arch,
}

impl Platform {
    /// Creates a `Platform` from an explicit OS and architecture. Mostly
    /// useful when you want to download an archive for a platform other
    /// than the one you are running on.
    #[must_use]
    pub fn new(os: Os, arch: Arch) -> Self {
        Platform { os, arch }
    }

    /// Resolves the platform of the running process.
    ///
    /// # Errors
    ///
    /// Returns a [`PlatformError`] if the host OS or architecture is not
    /// one the build index publishes archives for. There is deliberately
    /// no fallback value.
    pub fn from_host() -> Result<Self, PlatformError> {
        Self::from_parts(consts::OS, consts::ARCH)
    }

    fn from_parts(os: &str, arch: &str) -> Result<Self, PlatformError> {
        let os = match os {
            "windows" => Os::Windows,
            "linux" => Os::Linux,
            "macos" => Os::MacOS,
            other => return Err(PlatformError::UnsupportedOs(other.to_string())),
        };
        let arch = match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            other => return Err(PlatformError::UnsupportedArch(other.to_string())),
        };
        Ok(Platform { os, arch })
    }

    pub(crate) fn os(&self) -> Os {
        self.os
    }

    pub(crate) fn arch(&self) -> Arch {
        self.arch
    }

    pub(crate) fn extension(&self) -> Extension {
        match self.os {
            Os::Windows => Extension::Zip,
            Os::Linux | Os::MacOS => Extension::TarXz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case::windows_x86_64("windows", "x86_64", Os::Windows, Arch::X86_64)]
    #[case::windows_aarch64("windows", "aarch64", Os::Windows, Arch::Aarch64)]
    #[case::linux_x86_64("linux", "x86_64", Os::Linux, Arch::X86_64)]
    #[case::linux_aarch64("linux", "aarch64", Os::Linux, Arch::Aarch64)]
    #[case::macos_x86_64("macos", "x86_64", Os::MacOS, Arch::X86_64)]
    #[case::macos_aarch64("macos", "aarch64", Os::MacOS, Arch::Aarch64)]
    fn from_parts_supported(
        #[case] os: &str,
        #[case] arch: &str,
        #[case] expect_os: Os,
        #[case] expect_arch: Arch,
    ) {
        let platform = Platform::from_parts(os, arch).unwrap();
        assert_eq!(platform.os(), expect_os);
        assert_eq!(platform.arch(), expect_arch);
    }

    #[rstest]
    #[case::freebsd("freebsd", "x86_64", PlatformError::UnsupportedOs("freebsd".to_string()))]
    #[case::empty_os("", "x86_64", PlatformError::UnsupportedOs(String::new()))]
    #[case::riscv("linux", "riscv64", PlatformError::UnsupportedArch("riscv64".to_string()))]
    #[case::x86("windows", "x86", PlatformError::UnsupportedArch("x86".to_string()))]
    fn from_parts_unsupported(#[case] os: &str, #[case] arch: &str, #[case] expect: PlatformError) {
        assert_eq!(Platform::from_parts(os, arch).unwrap_err(), expect);
    }

    #[test]
    fn every_platform_has_a_known_extension() {
        for os in Os::iter() {
            for arch in Arch::iter() {
                let ext = Platform::new(os, arch).extension().extension();
                assert!(
                    ext == ".zip" || ext == ".tar.xz",
                    "{os}-{arch} resolved to {ext}"
                );
            }
        }
    }

    #[test]
    fn display_names_match_index_naming() {
        assert_eq!(Os::Windows.to_string(), "windows");
        assert_eq!(Os::Linux.to_string(), "linux");
        assert_eq!(Os::MacOS.to_string(), "macos");
        assert_eq!(Arch::X86_64.to_string(), "x86_64");
        assert_eq!(Arch::Aarch64.to_string(), "aarch64");
    }
}
