//! Double-buffered motion state
//!
//! Physics writes body transforms into the raw side of the table after each
//! step. The render loop promotes raw to snapshot at a single well-defined
//! point in the frame (`refresh`), so everything drawn in one frame sees one
//! consistent set of transforms even while the next physics step is already
//! running.

use slotmap::SecondaryMap;
use tumble_math::{mat4, Mat4};
use tumble_physics::BodyKey;

use crate::picking_color::PickingColor;

/// Which cube mesh variant a block renders with
///
/// Variants share geometry but map the texture atlas differently, so a pile
/// of blocks does not look like one block stamped over and over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockMesh {
    Default,
    Alt,
}

/// Per-body render state tracked alongside the physics body
#[derive(Clone, Debug)]
pub struct MotionRecord {
    /// Latest transform written by physics
    pub raw: Mat4,
    /// Transform the current frame draws with
    pub snapshot: Mat4,
    /// Picking identity, `None` if the palette was exhausted at spawn
    pub color: Option<PickingColor>,
    pub mesh: BlockMesh,
}

impl MotionRecord {
    pub fn new(transform: Mat4, color: Option<PickingColor>, mesh: BlockMesh) -> Self {
        Self {
            raw: transform,
            snapshot: transform,
            color,
            mesh,
        }
    }
}

/// One entry of a draw list: everything the renderer needs for one block
#[derive(Clone, Debug)]
pub struct DrawItem {
    pub transform: Mat4,
    pub mesh: BlockMesh,
    pub color: Option<PickingColor>,
    pub key: BodyKey,
}

/// Snapshot of the scene taken at refresh time
///
/// The renderer and the picking pass work from this list alone; neither
/// touches the simulation again until the next frame's refresh.
pub type DrawList = Vec<DrawItem>;

/// Table of motion records, keyed by physics body
#[derive(Default)]
pub struct MotionTable {
    records: SecondaryMap<BodyKey, MotionRecord>,
}

impl MotionTable {
    pub fn new() -> Self {
        Self {
            records: SecondaryMap::new(),
        }
    }

    pub fn insert(&mut self, key: BodyKey, record: MotionRecord) {
        self.records.insert(key, record);
    }

    pub fn remove(&mut self, key: BodyKey) -> Option<MotionRecord> {
        self.records.remove(key)
    }

    pub fn get(&self, key: BodyKey) -> Option<&MotionRecord> {
        self.records.get(key)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Overwrite the raw transform for a body (called after a physics step)
    pub fn write_raw(&mut self, key: BodyKey, transform: Mat4) -> bool {
        match self.records.get_mut(key) {
            Some(record) => {
                record.raw = transform;
                true
            }
            None => false,
        }
    }

    /// Promote raw transforms to snapshots and emit the frame's draw list
    pub fn refresh(&mut self) -> DrawList {
        let mut list = Vec::with_capacity(self.records.len());
        for (key, record) in &mut self.records {
            record.snapshot = record.raw;
            list.push(DrawItem {
                transform: record.snapshot,
                mesh: record.mesh,
                color: record.color,
                key,
            });
        }
        list
    }
}

/// Identity-transform record, handy in tests and at spawn time
pub fn identity_record(color: Option<PickingColor>, mesh: BlockMesh) -> MotionRecord {
    MotionRecord::new(mat4::IDENTITY, color, mesh)
}
