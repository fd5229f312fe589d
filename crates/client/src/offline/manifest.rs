//! Static asset manifest resolved against the site origin.

use noor_core::Error;
use url::Url;

use crate::fetch::resolve;

/// One manifest path and the URL it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub url: Url,
}

/// Ordered, de-duplicated list of assets pre-populated at install time.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Resolve every path against `origin`.
    ///
    /// Paths resolving to an already listed URL are skipped.
    pub fn resolve<S: AsRef<str>>(origin: &Url, paths: &[S]) -> Result<Self, Error> {
        let mut entries: Vec<ManifestEntry> = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let url = resolve(origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
            if entries.iter().any(|e| e.url == url) {
                continue;
            }
            entries.push(ManifestEntry { path: path.to_string(), url });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
