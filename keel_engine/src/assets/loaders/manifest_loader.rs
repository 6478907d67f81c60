/// Manifest loader
///
/// A manifest is a text file listing other assets, one `type:path` per line.
/// Paths are relative to the manifest's directory; blank lines and lines
/// starting with `#` are ignored. Every entry becomes a dependency, and the
/// resulting [`Manifest`] holds the loaded entries.
///
/// ```text
/// # level 1
/// text:intro.txt
/// binary:data/level1.bin
/// manifest:shared/common.manifest
/// ```

use std::any::Any;
use std::sync::Arc;
use crate::assets::{
    AssetDescriptor, AssetLoaderBase, AssetLoaderParameters, AssetManager, AssetObject,
    AssetType, SynchronousAssetLoader,
};
use crate::error::{Error, Result};
use crate::files::{FileHandle, FileHandleResolver};

/// One loaded manifest entry
#[derive(Clone)]
pub struct ManifestEntry {
    pub file_name: String,
    pub asset_type: AssetType,
    pub asset: AssetObject,
}

/// Loaded manifest: its entries, in file order
#[derive(Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<T: Any + Send + Sync>(&self, file_name: &str) -> Option<Arc<T>> {
        self.entries
            .iter()
            .find(|entry| entry.file_name == file_name)
            .and_then(|entry| entry.asset.clone().downcast::<T>().ok())
    }
}

pub struct ManifestLoader {
    resolver: Arc<dyn FileHandleResolver>,
}

impl ManifestLoader {
    pub fn new(resolver: Arc<dyn FileHandleResolver>) -> Self {
        Self { resolver }
    }
}

fn asset_type_from_tag(tag: &str) -> Option<AssetType> {
    match tag.to_ascii_lowercase().as_str() {
        "text" => Some(AssetType::Text),
        "binary" => Some(AssetType::Binary),
        "manifest" => Some(AssetType::Manifest),
        "texture" => Some(AssetType::Texture),
        "pixmap" => Some(AssetType::Pixmap),
        "atlas" | "textureatlas" => Some(AssetType::TextureAtlas),
        "music" => Some(AssetType::Music),
        "sound" => Some(AssetType::Sound),
        "particle" | "particleeffect" => Some(AssetType::ParticleEffect),
        "model" => Some(AssetType::Model),
        _ => None,
    }
}

/// Parse manifest text into descriptors, resolving paths against the manifest's directory
pub(crate) fn parse_manifest(file_name: &str, text: &str) -> Result<Vec<AssetDescriptor>> {
    let directory = match file_name.rfind('/') {
        Some(index) => &file_name[..=index],
        None => "",
    };

    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((tag, path)) = line.split_once(':') else {
            return Err(Error::InvalidResource(format!(
                "{}:{}: expected 'type:path', found '{}'",
                file_name,
                index + 1,
                line
            )));
        };
        let Some(asset_type) = asset_type_from_tag(tag.trim()) else {
            return Err(Error::InvalidResource(format!(
                "{}:{}: unknown asset type '{}'",
                file_name,
                index + 1,
                tag.trim()
            )));
        };

        let path = path.trim().replace('\\', "/");
        entries.push(AssetDescriptor::new(&format!("{}{}", directory, path), asset_type));
    }
    Ok(entries)
}

impl AssetLoaderBase for ManifestLoader {
    fn resolver(&self) -> &Arc<dyn FileHandleResolver> {
        &self.resolver
    }

    fn dependencies(
        &self,
        file_name: &str,
        file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<Vec<AssetDescriptor>> {
        parse_manifest(file_name, &file.read_string()?)
    }
}

impl SynchronousAssetLoader for ManifestLoader {
    fn load(
        &self,
        manager: &AssetManager,
        file_name: &str,
        file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<AssetObject> {
        let descriptors = parse_manifest(file_name, &file.read_string()?)?;

        let mut manifest = Manifest::default();
        for descriptor in descriptors {
            if manifest.entries.iter().any(|entry| entry.file_name == descriptor.file_name) {
                continue;
            }
            let asset = manager.get_object(&descriptor.file_name)?;
            manifest.entries.push(ManifestEntry {
                file_name: descriptor.file_name,
                asset_type: descriptor.asset_type,
                asset,
            });
        }
        Ok(Arc::new(manifest))
    }
}

#[cfg(test)]
#[path = "manifest_loader_tests.rs"]
mod tests;
