use std::collections::HashMap;
use egui::{Context, TextureHandle, TextureId, TextureOptions};
use log::debug;

use crate::config::EditorConfig;
use crate::raster::{Raster, RasterId};

/// Uploads object rasters to the GPU, caching one texture per raster
pub struct TextureManager {
    /// Cache of textures by raster identity
    texture_cache: HashMap<RasterId, TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<RasterId, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.texture_cache_size)
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets or uploads the texture for `raster`.
    ///
    /// A regenerated raster has a new id, so stale textures are never reused;
    /// they age out of the cache instead.
    pub fn texture_for(&mut self, ctx: &Context, raster: &Raster) -> TextureId {
        let key = raster.id();

        if let Some(handle) = self.texture_cache.get(&key) {
            self.last_used.insert(key, self.current_frame);
            return handle.id();
        }

        let [w, h] = raster.size();
        debug!("uploading {w}x{h} texture for {key:?}");
        let name = format!("raster_{key:?}");
        let handle = ctx.load_texture(name, raster.image().clone(), TextureOptions::LINEAR);
        let id = handle.id();

        self.texture_cache.insert(key, handle);
        self.last_used.insert(key, self.current_frame);
        self.prune_cache_if_needed();
        id
    }

    /// Drops the texture uploaded for `raster`, if any.
    pub fn invalidate(&mut self, raster: RasterId) {
        self.texture_cache.remove(&raster);
        self.last_used.remove(&raster);
    }

    /// Prunes the cache if it exceeds the maximum size
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(RasterId, u64)> = self.last_used
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect();

        // Oldest first; ties broken by upload order
        entries.sort_by_key(|(id, frame)| (*frame, *id));

        let to_remove = entries.len() - self.max_cache_size;
        for (id, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(id);
            self.last_used.remove(id);
        }
    }

    /// Clears all textures from the cache
    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    fn contains(&self, raster: &Raster) -> bool {
        self.texture_cache.contains_key(&raster.id())
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}
