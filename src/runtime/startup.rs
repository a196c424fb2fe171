use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::catalog::{self, Catalog};
use crate::config;
use crate::error::Result;

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Manifest(PathBuf),
    Directory(PathBuf),
}

/// Pick the catalog source: a command-line path wins (a file is read as a
/// manifest, anything else is scanned), then `catalog.manifest`, then the
/// working directory.
pub fn catalog_source(arg: Option<&str>, settings: &config::CatalogSettings) -> CatalogSource {
    if let Some(arg) = arg {
        let path = PathBuf::from(arg);
        return if path.is_file() {
            CatalogSource::Manifest(path)
        } else {
            CatalogSource::Directory(path)
        };
    }
    if let Some(manifest) = &settings.manifest {
        return CatalogSource::Manifest(manifest.clone());
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    CatalogSource::Directory(cwd)
}

pub fn load_catalog(source: &CatalogSource, settings: &config::Settings) -> Result<Catalog> {
    let summary_len = settings.audio.summary_length;
    let catalog = match source {
        CatalogSource::Manifest(path) => catalog::load_manifest(path, summary_len)?,
        CatalogSource::Directory(dir) => scan_dir(dir, settings, summary_len)?,
    };
    info!(
        ?source,
        albums = catalog.albums().len(),
        playlists = catalog.playlists().len(),
        "catalog loaded"
    );
    if catalog.is_empty() {
        warn!(?source, "catalog has no tracks");
    }
    Ok(catalog)
}

fn scan_dir(dir: &Path, settings: &config::Settings, summary_len: usize) -> Result<Catalog> {
    catalog::scan(dir, &settings.catalog, summary_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogSettings;

    #[test]
    fn argument_file_is_a_manifest_and_directory_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("catalog.toml");
        std::fs::write(&manifest, "").unwrap();
        let settings = CatalogSettings::default();

        assert_eq!(
            catalog_source(manifest.to_str(), &settings),
            CatalogSource::Manifest(manifest.clone())
        );
        assert_eq!(
            catalog_source(dir.path().to_str(), &settings),
            CatalogSource::Directory(dir.path().to_path_buf())
        );
    }

    #[test]
    fn configured_manifest_used_without_argument() {
        let settings = CatalogSettings {
            manifest: Some(PathBuf::from("/srv/catalog.toml")),
            ..CatalogSettings::default()
        };
        assert_eq!(
            catalog_source(None, &settings),
            CatalogSource::Manifest(PathBuf::from("/srv/catalog.toml"))
        );
    }

    #[test]
    fn load_catalog_reads_an_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("catalog.toml");
        std::fs::write(&manifest, "").unwrap();

        let catalog =
            load_catalog(&CatalogSource::Manifest(manifest), &config::Settings::default()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn load_catalog_propagates_missing_manifest() {
        let missing = CatalogSource::Manifest(PathBuf::from("/definitely/not/here.toml"));
        assert!(load_catalog(&missing, &config::Settings::default()).is_err());
    }
}
