//! Level save/load
//!
//! A level is a versioned JSON document listing blocks. Each block keeps its
//! shape as compact arc records (corners included), so a saved level rebuilds
//! exactly the arcs that were authored.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;

use crate::config::PhysicsConfig;
use crate::error::PlanetariaError;
use crate::geometry::{ArcRecord, Shape};
use crate::sim::{Block, BlockId, PhysicsMaterial, World};

/// Current level format version
pub const LEVEL_VERSION: u32 = 1;

fn default_layer() -> u32 {
    1
}

/// One block as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    pub rotation: DQuat,
    #[serde(default)]
    pub angular_velocity: DVec3,
    pub arcs: Vec<ArcRecord>,
    #[serde(default)]
    pub material: PhysicsMaterial,
    #[serde(default = "default_layer")]
    pub layer: u32,
}

impl BlockData {
    pub fn from_block(block: &Block) -> Self {
        Self {
            rotation: block.rotation,
            angular_velocity: block.angular_velocity,
            arcs: block.shape.to_records(),
            material: block.material,
            layer: block.layer,
        }
    }

    /// Rebuild the block. Ids are assigned by the world on insertion.
    fn to_block(&self, index: usize) -> Result<Block, PlanetariaError> {
        if !self.rotation.is_finite() || self.rotation.length_squared() == 0.0 {
            return Err(PlanetariaError::InvalidBlock {
                index,
                reason: "rotation is not a usable quaternion",
            });
        }
        if !self.angular_velocity.is_finite() {
            return Err(PlanetariaError::InvalidBlock {
                index,
                reason: "angular velocity is not finite",
            });
        }
        let shape = Shape::from_records(&self.arcs)?;
        let mut block = Block::new(BlockId(0), Rc::new(shape), self.rotation, self.material);
        block.angular_velocity = self.angular_velocity;
        block.layer = self.layer;
        Ok(block)
    }
}

/// A whole level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub version: u32,
    pub blocks: Vec<BlockData>,
}

impl Default for LevelData {
    fn default() -> Self {
        Self {
            version: LEVEL_VERSION,
            blocks: Vec::new(),
        }
    }
}

impl LevelData {
    /// Snapshot the blocks of a world, in id order
    pub fn from_world(world: &World) -> Self {
        Self {
            version: LEVEL_VERSION,
            blocks: world.blocks().map(BlockData::from_block).collect(),
        }
    }

    /// Add every block to `world`. Nothing is added if any block is invalid.
    pub fn spawn_into(&self, world: &mut World) -> Result<Vec<BlockId>, PlanetariaError> {
        if self.version != LEVEL_VERSION {
            return Err(PlanetariaError::UnsupportedVersion {
                found: self.version,
                expected: LEVEL_VERSION,
            });
        }
        let blocks = self
            .blocks
            .iter()
            .enumerate()
            .map(|(index, data)| data.to_block(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blocks.into_iter().map(|block| world.insert_block(block)).collect())
    }

    /// A fresh world holding this level's blocks
    pub fn build(&self, config: PhysicsConfig) -> Result<World, PlanetariaError> {
        let mut world = World::new(config);
        self.spawn_into(&mut world)?;
        Ok(world)
    }

    pub fn from_json(json: &str) -> Result<Self, PlanetariaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PlanetariaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanetariaError> {
        let path = path.as_ref();
        let level = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded level with {} blocks from {}", level.blocks.len(), path.display());
        Ok(level)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PlanetariaError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Level saved to {}", path.display());
        Ok(())
    }
}
