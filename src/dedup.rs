//! Content-addressed texture store shared by every asset of one export run.

use std::collections::HashMap;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::{
    error::ExportError,
    scene::{TextureChannel, TextureFormat},
    texture::{ResizeInterpolation, downscale_encoded},
};

/// Hex characters of the digest kept in file names.
pub const DIGEST_SUFFIX_LEN: usize = 16;

/// Directory of deduplicated textures inside the container.
pub const TEXTURE_DIR: &str = "meshes/textures";

/// One stored texture.
#[derive(Debug, Clone)]
pub struct StoredTexture {
    pub file_name: String,
    pub digest: String,
    pub format: TextureFormat,
    /// Channel of the first material slot that referenced the texture.
    pub channel: TextureChannel,
    /// Bytes to write; downscaled when a size limit is configured.
    pub bytes: Vec<u8>,
}

impl StoredTexture {
    /// Path inside the container.
    pub fn container_path(&self) -> String {
        format!("{}/{}", TEXTURE_DIR, self.file_name)
    }
}

/// Result of [`TextureStore::intern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternedTexture {
    /// Position of the texture in first-interned order.
    pub index: usize,
    pub file_name: String,
    /// `true` only for the call that stored the bytes.
    pub newly_stored: bool,
}

#[derive(Debug, Clone, Copy)]
struct DownscalePolicy {
    max_size: u32,
    interpolation: ResizeInterpolation,
}

#[derive(Debug, Default)]
struct StoreState {
    by_digest: HashMap<String, usize>,
    by_suffix: HashMap<String, String>,
    entries: Vec<StoredTexture>,
}

/// Deduplicating texture table.
///
/// Interning goes through one lock, so producers on several threads still
/// observe each other's entries.
#[derive(Debug, Default)]
pub struct TextureStore {
    state: Mutex<StoreState>,
    downscale: Option<DownscalePolicy>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Downscale textures whose longer side exceeds `max_size` before storage.
    /// Identity is still computed on the original bytes.
    pub fn with_downscale(mut self, max_size: u32, interpolation: ResizeInterpolation) -> Self {
        self.downscale = Some(DownscalePolicy {
            max_size,
            interpolation,
        });
        self
    }

    /// Interns texture bytes and returns their stable file name.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Encoded image bytes.
    /// * `hint` - Human-readable name used as the file name stem.
    /// * `format` - Encoding of `bytes`; selects the extension.
    /// * `channel` - Material slot of this reference.
    ///
    /// # Returns
    ///
    /// The file name under [`TEXTURE_DIR`]. Byte-identical input always yields
    /// the name assigned on first sight.
    pub fn intern(
        &self,
        bytes: &[u8],
        hint: &str,
        format: TextureFormat,
        channel: TextureChannel,
    ) -> Result<InternedTexture, ExportError> {
        let digest = Sha256::digest(bytes);
        self.intern_with_digest(&hex::encode(digest), bytes, hint, format, channel)
    }

    fn intern_with_digest(
        &self,
        digest: &str,
        bytes: &[u8],
        hint: &str,
        format: TextureFormat,
        channel: TextureChannel,
    ) -> Result<InternedTexture, ExportError> {
        let mut state = self.state.lock();

        if let Some(&index) = state.by_digest.get(digest) {
            return Ok(InternedTexture {
                index,
                file_name: state.entries[index].file_name.clone(),
                newly_stored: false,
            });
        }

        let suffix = &digest[..DIGEST_SUFFIX_LEN.min(digest.len())];
        if let Some(existing) = state.by_suffix.get(suffix) {
            if existing != digest {
                return Err(ExportError::TextureDigestCollision {
                    suffix: suffix.to_string(),
                });
            }
        }

        let stored_bytes = match self.downscale {
            Some(policy) => downscale_encoded(bytes, format, policy.max_size, policy.interpolation)?
                .unwrap_or_else(|| bytes.to_vec()),
            None => bytes.to_vec(),
        };

        let file_name = format!(
            "{}_{}.{}",
            clean_texture_hint(hint),
            suffix,
            format.extension()
        );
        let index = state.entries.len();
        state.entries.push(StoredTexture {
            file_name: file_name.clone(),
            digest: digest.to_string(),
            format,
            channel,
            bytes: stored_bytes,
        });
        state.by_digest.insert(digest.to_string(), index);
        state.by_suffix.insert(suffix.to_string(), digest.to_string());

        Ok(InternedTexture {
            index,
            file_name,
            newly_stored: true,
        })
    }

    pub fn get(&self, index: usize) -> Option<StoredTexture> {
        self.state.lock().entries.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored textures in first-interned order.
    pub fn snapshot(&self) -> Vec<StoredTexture> {
        self.state.lock().entries.clone()
    }
}

/// File name stem derived from a texture hint.
///
/// Drops the `_Diffuse` / `_diffuse` suffix common in exported material names
/// and any character outside `[A-Za-z0-9_-]`.
pub fn clean_texture_hint(hint: &str) -> String {
    let stem = hint.replace("_Diffuse", "").replace("_diffuse", "");
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "texture".to_string()
    } else {
        cleaned
    }
}
