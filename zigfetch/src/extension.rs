use strum::EnumIter;

/// The archive format the build index serves for a given OS. Windows
/// builds ship as zip files and everything else as xz-compressed
/// tarballs.
#[derive(Clone, Copy, Debug, EnumIter, PartialEq, Eq)]
pub(crate) enum Extension {
    TarXz,
    Zip,
}

impl Extension {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            Extension::TarXz => ".tar.xz",
            Extension::Zip => ".zip",
        }
    }
}
