//! Read-only technology catalog assembled from JSON assets.
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::CatalogLoader;
use crate::app_types::AppTypes;
use crate::tech::{Category, Technology, TechnologyModifier};

const TECHNOLOGIES_JSON: &str = include_str!("../assets/technologies.json");
const MODIFIERS_JSON: &str = include_str!("../assets/modifiers.json");
const APP_TYPES_JSON: &str = include_str!("../assets/app_types.json");

static BUILTIN: OnceCell<Catalog> = OnceCell::new();

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {asset}: {source}")]
    Parse {
        asset: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    fn parse(asset: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Parse { asset, source }
    }
}

/// Shape of `technologies.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnologiesFile {
    pub technologies: Vec<Technology>,
}

/// Shape of `modifiers.json`: modifier lists keyed by source id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifiersFile {
    #[serde(default)]
    pub modifiers: BTreeMap<String, Vec<TechnologyModifier>>,
}

/// Immutable list of technologies with an id index.
///
/// Entries keep their file order. Lookups by id resolve to the first entry
/// with that id; duplicates are kept so the lint can report them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    technologies: Vec<Technology>,
    index: HashMap<String, usize>,
}

impl Catalog {
    #[must_use]
    pub fn new(technologies: Vec<Technology>) -> Self {
        let mut index = HashMap::with_capacity(technologies.len());
        for (position, tech) in technologies.iter().enumerate() {
            index.entry(tech.id.clone()).or_insert(position);
        }
        Self {
            technologies,
            index,
        }
    }

    /// Merge per-source modifier tables into the technologies.
    ///
    /// Tables keyed by an id that is not in the catalog are ignored.
    #[must_use]
    pub fn from_parts(
        mut technologies: Vec<Technology>,
        modifiers: BTreeMap<String, Vec<TechnologyModifier>>,
    ) -> Self {
        for (source, list) in modifiers {
            let mut matched = false;
            for tech in technologies.iter_mut().filter(|tech| tech.id == source) {
                tech.modifiers.extend(list.iter().cloned());
                matched = true;
            }
            if !matched {
                log::debug!(
                    "ignoring {} modifiers for unknown technology '{source}'",
                    list.len()
                );
            }
        }
        Self::new(technologies)
    }

    /// Parse a catalog from the technology and modifier JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document cannot be parsed.
    pub fn from_json(technologies: &str, modifiers: &str) -> Result<Self, CatalogError> {
        let techs: TechnologiesFile =
            serde_json::from_str(technologies).map_err(CatalogError::parse("technologies.json"))?;
        let mods: ModifiersFile =
            serde_json::from_str(modifiers).map_err(CatalogError::parse("modifiers.json"))?;
        Ok(Self::from_parts(techs.technologies, mods.modifiers))
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Technology> {
        self.index.get(id).map(|&position| &self.technologies[position])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Technology> {
        self.technologies.iter()
    }

    #[must_use]
    pub fn technologies(&self) -> &[Technology] {
        &self.technologies
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Technology> {
        self.technologies
            .iter()
            .filter(move |tech| tech.category == category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Technology;
    type IntoIter = std::slice::Iter<'a, Technology>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Catalog parsed from the embedded assets, built on first use.
///
/// # Errors
///
/// Returns an error if the embedded assets fail to parse.
pub fn builtin_catalog() -> Result<&'static Catalog, CatalogError> {
    BUILTIN.get_or_try_init(|| Catalog::from_json(TECHNOLOGIES_JSON, MODIFIERS_JSON))
}

/// Loader backed by the assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalogLoader;

impl CatalogLoader for EmbeddedCatalogLoader {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        builtin_catalog().cloned()
    }

    fn load_app_types(&self) -> Result<AppTypes, Self::Error> {
        AppTypes::from_json(APP_TYPES_JSON).map_err(CatalogError::parse("app_types.json"))
    }
}
