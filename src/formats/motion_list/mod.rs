//! Motion list asset format
//!
//! A motion list bundles many motion assets in one image, each slot holding
//! a complete nested motion with its own header. Four schema versions are
//! supported: 60, 85, 99 and 486. All decode to the same [`MotionList`]
//! document.

mod document;
mod reader;

pub use document::MotionList;

pub(crate) use reader::{read_v60, read_v85, read_v99, read_v486};
