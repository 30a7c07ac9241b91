//! Image-set configuration and registry resolution
//!
//! The configuration file maps image-set names to [`ImageSet`] entries. Two
//! shapes have accumulated in the format and both stay supported: the older
//! map-of-registries form, where `read`/`write` select an alias out of a
//! `registries` map, and the direct form with explicit source/destination
//! pairs. [`ImageSet::resolve`] collapses either shape into one canonical
//! [`ResolvedImageSet`] right after load so nothing downstream has to know
//! which shape was used.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PromoterError, Result};

/// One registry endpoint. An empty `url` means the implicit default
/// registry; `auth` is an opaque credential blob passed through to the
/// daemon unexamined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub auth: String,
    #[serde(default)]
    pub namespace: String,
}

/// A source/destination value pair used by the direct config shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuePair {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
}

/// A named promotion target in one of the two supported config shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSet {
    /// Map-of-registries form: `read`/`write` name aliases into `registries`.
    Aliased {
        #[serde(default)]
        name: String,
        #[serde(default)]
        images: Vec<String>,
        #[serde(default)]
        read: String,
        #[serde(default)]
        write: String,
        registries: HashMap<String, Registry>,
    },
    /// Direct form: explicit source/destination pairs, each optional.
    Direct {
        #[serde(default)]
        name: String,
        #[serde(default)]
        images: Vec<String>,
        #[serde(default)]
        registry: ValuePair,
        #[serde(default)]
        namespace: ValuePair,
        #[serde(default)]
        auth: ValuePair,
    },
}

/// An image-set collapsed to exactly one source and one destination registry.
#[derive(Debug, Clone)]
pub struct ResolvedImageSet {
    pub name: String,
    pub images: Vec<String>,
    pub source: Registry,
    pub destination: Registry,
}

impl ImageSet {
    pub fn name(&self) -> &str {
        match self {
            ImageSet::Aliased { name, .. } | ImageSet::Direct { name, .. } => name,
        }
    }

    pub fn images(&self) -> &[String] {
        match self {
            ImageSet::Aliased { images, .. } | ImageSet::Direct { images, .. } => images,
        }
    }

    /// Collapse this image-set into its canonical source/destination pair.
    ///
    /// Defaulting rules, applied uniformly to both shapes: an omitted
    /// destination URL, namespace, or auth falls back to the source value.
    /// Resolution is idempotent: resolving an already-resolved set yields
    /// the same pair.
    pub fn resolve(&self) -> Result<ResolvedImageSet> {
        let (source, destination) = match self {
            ImageSet::Aliased {
                read,
                write,
                registries,
                ..
            } => {
                let source = registries.get(read).cloned().ok_or_else(|| {
                    PromoterError::Config(format!(
                        "image-set '{}': read alias '{}' does not name a registry",
                        self.name(),
                        read
                    ))
                })?;
                let destination = registries.get(write).cloned().unwrap_or_default();
                (source, destination)
            }
            ImageSet::Direct {
                registry,
                namespace,
                auth,
                ..
            } => {
                let source = Registry {
                    url: registry.source.clone(),
                    namespace: namespace.source.clone(),
                    auth: auth.source.clone(),
                };
                let destination = Registry {
                    url: registry.destination.clone(),
                    namespace: namespace.destination.clone(),
                    auth: auth.destination.clone(),
                };
                (source, destination)
            }
        };

        let mut destination = destination;
        if destination.url.is_empty() {
            destination.url = source.url.clone();
        }
        if destination.namespace.is_empty() {
            destination.namespace = source.namespace.clone();
        }
        if destination.auth.is_empty() {
            destination.auth = source.auth.clone();
        }

        Ok(ResolvedImageSet {
            name: self.name().to_string(),
            images: self.images().to_vec(),
            source,
            destination,
        })
    }
}

/// The loaded configuration: image-set name -> image-set.
#[derive(Debug, Clone, Default)]
pub struct PromotionConfig {
    sets: HashMap<String, ImageSet>,
}

impl PromotionConfig {
    /// Load a configuration file. A `.json` extension selects JSON,
    /// anything else is read as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PromoterError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json(&raw)
        } else {
            Self::from_yaml(&raw)
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let sets = serde_yaml::from_str(raw)?;
        Ok(Self { sets })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let sets = serde_json::from_str(raw)?;
        Ok(Self { sets })
    }

    pub fn get(&self, name: &str) -> Option<&ImageSet> {
        self.sets.get(name)
    }
}
