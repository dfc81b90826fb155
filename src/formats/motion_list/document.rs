//! Motion list document structure definitions

use crate::formats::motion::{DecodeWarning, Motion, Skeleton};

/// A decoded motion container.
///
/// Lists keep their slot layout: a slot that was empty in the file, or
/// whose motion failed to decode, stays in place as `None` so slot indices
/// remain meaningful to callers.
#[derive(Debug, Clone)]
pub struct MotionList {
    /// Schema version the asset was decoded from.
    pub version: u32,
    /// Container name as stored.
    pub name: String,
    /// One entry per slot, in stored order.
    pub motions: Vec<Option<Motion>>,
    /// Hierarchy lifted from the first decoded motion that carries bones.
    pub skeleton: Option<Skeleton>,
    /// Non-fatal problems encountered while decoding.
    pub warnings: Vec<DecodeWarning>,
}

impl MotionList {
    /// Number of slots, counting empty ones.
    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    /// Iterates the motions that decoded, skipping empty and failed slots.
    pub fn decoded_motions(&self) -> impl Iterator<Item = &Motion> {
        self.motions.iter().filter_map(Option::as_ref)
    }

    pub fn motion_by_name(&self, name: &str) -> Option<&Motion> {
        self.decoded_motions().find(|motion| motion.name == name)
    }
}
