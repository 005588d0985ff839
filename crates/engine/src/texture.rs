use std::array;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureId {
    #[default]
    Nil,
    Player,
    Goblin,
    Troll,
}

impl TextureId {
    pub const COUNT: usize = 4;
    pub const ALL: [TextureId; Self::COUNT] = [Self::Nil, Self::Player, Self::Goblin, Self::Troll];

    pub const fn index(self) -> usize {
        match self {
            Self::Nil => 0,
            Self::Player => 1,
            Self::Goblin => 2,
            Self::Troll => 3,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Asset key of the image backing this id; the nil texture has none.
    pub fn key(self) -> Option<&'static str> {
        match self {
            Self::Nil => None,
            Self::Player => Some("character-001-idle"),
            Self::Goblin => Some("goblin-001-idle"),
            Self::Troll => Some("troll-001-idle"),
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "nil" => Some(Self::Nil),
            "player" => Some(Self::Player),
            "goblin" => Some(Self::Goblin),
            "troll" => Some(Self::Troll),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureKeyError {
    #[error("texture key must not be empty")]
    Empty,
    #[error("texture key must not start with '/'")]
    LeadingSlash,
    #[error("texture key must not contain '\\\\'")]
    Backslash,
    #[error("texture key must not contain '..'")]
    ParentTraversal,
    #[error("texture key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error(transparent)]
    InvalidKey(#[from] TextureKeyError),
    #[error("failed to open texture {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("rgba buffer holds {actual} bytes, {width}x{height} needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Decoded RGBA8 image. The zero-sized texture is the nil texture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    pub fn nil() -> Self {
        Self::default()
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, TextureLoadError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureLoadError::BufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn is_nil(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2 {
            x: self.width as f32,
            y: self.height as f32,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Texture lookup keyed by [`TextureId`]. Any id without a loaded image,
/// and any out-of-range raw index, resolves to the nil texture.
#[derive(Debug, Clone)]
pub struct TextureTable {
    textures: [Texture; TextureId::COUNT],
}

impl Default for TextureTable {
    fn default() -> Self {
        Self {
            textures: array::from_fn(|_| Texture::nil()),
        }
    }
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every keyed texture from `<dir>/<key>.png`. Failures are logged
    /// once per key and leave that id on the nil texture.
    pub fn load_from_dir(dir: &Path) -> Self {
        let mut table = Self::new();
        let mut warned_keys = HashSet::new();
        for id in TextureId::ALL {
            let Some(key) = id.key() else {
                continue;
            };
            match load_texture(dir, key) {
                Ok(texture) => {
                    debug!(
                        key,
                        width = texture.width(),
                        height = texture.height(),
                        "texture_loaded"
                    );
                    table.insert(id, texture);
                }
                Err(error) => {
                    if warned_keys.insert(key) {
                        warn!(key, error = %error, "texture_load_failed; using nil texture");
                    }
                }
            }
        }
        table
    }

    /// Returns false when asked to replace the nil texture.
    pub fn insert(&mut self, id: TextureId, texture: Texture) -> bool {
        if id == TextureId::Nil {
            return false;
        }
        self.textures[id.index()] = texture;
        true
    }

    pub fn get(&self, id: TextureId) -> &Texture {
        &self.textures[id.index()]
    }

    pub fn get_by_index(&self, index: i64) -> &Texture {
        self.get(TextureId::from_index(index).unwrap_or(TextureId::Nil))
    }

    pub fn loaded_count(&self) -> usize {
        self.textures.iter().filter(|texture| !texture.is_nil()).count()
    }
}

pub fn load_texture(dir: &Path, key: &str) -> Result<Texture, TextureLoadError> {
    let path = texture_path(dir, key)?;
    let reader = ImageReader::open(&path).map_err(|source| TextureLoadError::Open {
        path: path.clone(),
        source,
    })?;
    let decoded = reader
        .decode()
        .map_err(|source| TextureLoadError::Decode {
            path: path.clone(),
            source,
        })?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    Texture::from_rgba(width, height, decoded.into_raw())
}

pub fn texture_path(dir: &Path, key: &str) -> Result<PathBuf, TextureKeyError> {
    validate_texture_key(key)?;
    Ok(dir.join(format!("{key}.png")))
}

fn validate_texture_key(key: &str) -> Result<(), TextureKeyError> {
    if key.is_empty() {
        return Err(TextureKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(TextureKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(TextureKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(TextureKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(TextureKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_texture(width: u32, height: u32, color: [u8; 4]) -> Texture {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Texture::from_rgba(width, height, rgba).expect("texture")
    }

    #[test]
    fn builtin_keys_are_valid() {
        for id in TextureId::ALL {
            if let Some(key) = id.key() {
                assert!(validate_texture_key(key).is_ok(), "key={key}");
            }
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "..", "a/../b", r"a\b", "A", "a.b"] {
            assert!(validate_texture_key(key).is_err(), "key={key}");
        }
        assert_eq!(
            validate_texture_key("goblin idle"),
            Err(TextureKeyError::InvalidCharacter { character: ' ' })
        );
    }

    #[test]
    fn out_of_range_index_resolves_to_nil() {
        let mut table = TextureTable::new();
        table.insert(TextureId::Goblin, solid_texture(2, 2, [1, 2, 3, 255]));

        assert!(table.get_by_index(-1).is_nil());
        assert!(table.get_by_index(TextureId::COUNT as i64).is_nil());
        assert!(table.get_by_index(i64::MAX).is_nil());
        assert_eq!(table.get_by_index(2).width(), 2);
    }

    #[test]
    fn unloaded_ids_resolve_to_nil_and_nil_cannot_be_replaced() {
        let mut table = TextureTable::new();
        assert!(table.get(TextureId::Troll).is_nil());
        assert!(!table.insert(TextureId::Nil, solid_texture(1, 1, [0, 0, 0, 255])));
        assert!(table.get(TextureId::Nil).is_nil());
        assert_eq!(table.loaded_count(), 0);
    }

    #[test]
    fn from_rgba_rejects_short_buffers() {
        let err = Texture::from_rgba(2, 2, vec![0; 15]).expect_err("short buffer");
        assert!(matches!(
            err,
            TextureLoadError::BufferSize {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn pixel_lookup_is_bounds_checked() {
        let texture = solid_texture(3, 2, [9, 8, 7, 6]);
        assert_eq!(texture.pixel(2, 1), Some([9, 8, 7, 6]));
        assert_eq!(texture.pixel(3, 0), None);
        assert_eq!(texture.size(), Vec2::new(3.0, 2.0));
    }

    #[test]
    fn load_from_dir_reads_present_pngs_and_skips_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut image = image::RgbaImage::new(4, 3);
        image.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        image
            .save(dir.path().join("goblin-001-idle.png"))
            .expect("write png");
        std::fs::write(dir.path().join("troll-001-idle.png"), b"not a png").expect("write junk");

        let table = TextureTable::load_from_dir(dir.path());

        let goblin = table.get(TextureId::Goblin);
        assert_eq!((goblin.width(), goblin.height()), (4, 3));
        assert_eq!(goblin.pixel(1, 2), Some([10, 20, 30, 255]));
        assert!(table.get(TextureId::Player).is_nil());
        assert!(table.get(TextureId::Troll).is_nil());
        assert_eq!(table.loaded_count(), 1);
    }

    #[test]
    fn load_texture_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_texture(dir.path(), "character-001-idle").expect_err("missing");
        assert!(matches!(err, TextureLoadError::Open { .. }));
    }
}
