//! Catalog sources for the tester: the embedded assets or a directory on disk.
use archsandbox_engine::{AppTypes, Catalog, CatalogError, CatalogLoader, EmbeddedCatalogLoader};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TECHNOLOGIES_FILE: &str = "technologies.json";
pub const MODIFIERS_FILE: &str = "modifiers.json";
pub const APP_TYPES_FILE: &str = "app_types.json";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Reads `technologies.json`, `modifiers.json` and `app_types.json` from one directory.
#[derive(Debug, Clone)]
pub struct DirCatalogLoader {
    root: PathBuf,
}

impl DirCatalogLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, name: &str) -> Result<String, LoaderError> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|source| LoaderError::Io { path, source })
    }
}

impl CatalogLoader for DirCatalogLoader {
    type Error = LoaderError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        let technologies = self.read(TECHNOLOGIES_FILE)?;
        let modifiers = self.read(MODIFIERS_FILE)?;
        let catalog = Catalog::from_json(&technologies, &modifiers)?;
        log::debug!(
            "loaded {} technologies from {}",
            catalog.len(),
            self.root.display()
        );
        Ok(catalog)
    }

    fn load_app_types(&self) -> Result<AppTypes, Self::Error> {
        let json = self.read(APP_TYPES_FILE)?;
        AppTypes::from_json(&json).map_err(|source| LoaderError::Json {
            path: self.root.join(APP_TYPES_FILE),
            source,
        })
    }
}

/// Either the compiled-in catalog or a directory override.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Embedded(EmbeddedCatalogLoader),
    Dir(DirCatalogLoader),
}

impl CatalogSource {
    pub fn new(dir: Option<&Path>) -> Self {
        dir.map_or(Self::Embedded(EmbeddedCatalogLoader), |dir| {
            Self::Dir(DirCatalogLoader::new(dir))
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Embedded(_) => "embedded catalog".to_string(),
            Self::Dir(loader) => loader.root.display().to_string(),
        }
    }
}

impl CatalogLoader for CatalogSource {
    type Error = LoaderError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        match self {
            Self::Embedded(loader) => Ok(loader.load_catalog()?),
            Self::Dir(loader) => loader.load_catalog(),
        }
    }

    fn load_app_types(&self) -> Result<AppTypes, Self::Error> {
        match self {
            Self::Embedded(loader) => Ok(loader.load_app_types()?),
            Self::Dir(loader) => loader.load_app_types(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "archsandbox-loader-{label}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_catalog_from_directory() {
        let dir = temp_dir("ok");
        std::fs::write(
            dir.join(TECHNOLOGIES_FILE),
            r#"{"technologies":[{"id":"go","name":"Go","category":"language","description":"","pros":[],"cons":[],"performance":90,"stability":85,"userFriendliness":70,"developmentSpeed":75,"maintainability":85,"complexity":40,"cost":20}]}"#,
        )
        .unwrap();
        std::fs::write(dir.join(MODIFIERS_FILE), r#"{"modifiers":{}}"#).unwrap();
        std::fs::write(dir.join(APP_TYPES_FILE), r#"{"appTypes":[]}"#).unwrap();

        let loader = CatalogSource::new(Some(&dir));
        let catalog = loader.load_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("go"));
        assert!(loader.load_app_types().unwrap().is_empty());
        assert_eq!(loader.describe(), dir.display().to_string());
    }

    #[test]
    fn missing_directory_reports_path() {
        let loader = DirCatalogLoader::new("/nonexistent/archsandbox-catalog");
        let err = loader.load_catalog().unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
        assert!(err.to_string().contains(TECHNOLOGIES_FILE));
    }

    #[test]
    fn embedded_source_matches_builtin() {
        let source = CatalogSource::new(None);
        let catalog = source.load_catalog().unwrap();
        assert_eq!(catalog.len(), archsandbox_engine::builtin_catalog().unwrap().len());
        assert!(source.load_app_types().unwrap().get_by_id("ecommerce").is_some());
    }
}
