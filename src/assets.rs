use crate::error::{SceneError, SceneResult};
use crate::text::GlyphRasterizer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Font asset
#[derive(Debug, Clone)]
pub struct FontAsset {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Asset loader that manages loading and caching of fonts
pub struct AssetLoader {
    fonts: HashMap<PathBuf, FontAsset>,
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with a base path for resolving relative paths
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            fonts: HashMap::new(),
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a font asset
    pub fn load_font(&mut self, path: &Path) -> SceneResult<&FontAsset> {
        let full_path = self.resolve_path(path);

        if !self.fonts.contains_key(&full_path) {
            let data = std::fs::read(&full_path).map_err(|e| SceneError::MissingFont {
                path: full_path.clone(),
                reason: e.to_string(),
            })?;
            debug!(path = %full_path.display(), bytes = data.len(), "loaded font");

            self.fonts.insert(
                full_path.clone(),
                FontAsset {
                    path: full_path.clone(),
                    data,
                },
            );
        }

        self.fonts
            .get(&full_path)
            .ok_or(SceneError::MissingFont {
                path: full_path,
                reason: "not cached".to_string(),
            })
    }

    /// Glyph rasterizer for `font`, or block glyphs when no font is configured
    pub fn rasterizer(&mut self, font: Option<&Path>) -> SceneResult<GlyphRasterizer> {
        let Some(path) = font else {
            info!("no font configured, using block glyphs");
            return Ok(GlyphRasterizer::Blocks);
        };

        let asset = self.load_font(path)?;
        GlyphRasterizer::from_font_bytes(asset.data.clone()).ok_or_else(|| {
            SceneError::MissingFont {
                path: asset.path.clone(),
                reason: "not a TrueType/OpenType font".to_string(),
            }
        })
    }

    /// Resolve a path relative to the base path
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Get statistics about loaded assets
    pub fn stats(&self) -> AssetStats {
        AssetStats {
            fonts: self.fonts.len(),
            bytes: self.fonts.values().map(|f| f.data.len()).sum(),
        }
    }

    /// Clear all loaded assets from memory
    pub fn clear(&mut self) {
        self.fonts.clear();
    }
}

/// Statistics about loaded assets
#[derive(Debug, Clone)]
pub struct AssetStats {
    pub fonts: usize,
    pub bytes: usize,
}

impl std::fmt::Display for AssetStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fonts: {}, Bytes: {}", self.fonts, self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_font_uses_blocks() {
        let mut loader = AssetLoader::new(".");
        let rasterizer = loader.rasterizer(None).unwrap();
        assert!(matches!(rasterizer, GlyphRasterizer::Blocks));
        assert_eq!(loader.stats().fonts, 0);
    }

    #[test]
    fn test_missing_font() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = AssetLoader::new(temp_dir.path());

        let err = loader.rasterizer(Some(Path::new("Inter.ttf"))).unwrap_err();
        assert!(matches!(err, SceneError::MissingFont { .. }));
        assert!(err.to_string().contains("Inter.ttf"));
    }

    #[test]
    fn test_invalid_font_data() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.ttf"), b"definitely not a font").unwrap();
        let mut loader = AssetLoader::new(temp_dir.path());

        let err = loader.rasterizer(Some(Path::new("broken.ttf"))).unwrap_err();
        assert!(err.to_string().contains("not a TrueType/OpenType font"));
    }

    #[test]
    fn test_font_cache_and_stats() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.ttf"), [1u8, 2, 3]).unwrap();
        let mut loader = AssetLoader::new(temp_dir.path());

        loader.load_font(Path::new("a.ttf")).unwrap();
        loader.load_font(Path::new("a.ttf")).unwrap();
        let stats = loader.stats();
        assert_eq!(stats.fonts, 1);
        assert_eq!(stats.bytes, 3);
        assert_eq!(stats.to_string(), "Fonts: 1, Bytes: 3");

        loader.clear();
        assert_eq!(loader.stats().fonts, 0);
    }

    #[test]
    fn test_absolute_path_ignores_base() {
        let temp_dir = TempDir::new().unwrap();
        let font = temp_dir.path().join("abs.ttf");
        fs::write(&font, [0u8; 4]).unwrap();

        let mut loader = AssetLoader::new("/somewhere/else");
        assert_eq!(loader.load_font(&font).unwrap().path, font);
    }
}
