//! The tokenizer's atomic unit: one word with its page-relative bounding box.

use super::bbox::BoundingBox;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub page_index: usize,
    pub bbox: BoundingBox,
}

impl Word {
    pub fn new(text: impl Into<String>, page_index: usize, bbox: BoundingBox) -> Self {
        Self { text: text.into(), page_index, bbox }
    }

    pub fn x0(&self) -> f32 {
        self.bbox.x0
    }

    pub fn y0(&self) -> f32 {
        self.bbox.y0
    }

    pub fn x1(&self) -> f32 {
        self.bbox.x1
    }

    pub fn y1(&self) -> f32 {
        self.bbox.y1
    }

    /// `top := y0` per spec §3.
    pub fn top(&self) -> f32 {
        self.bbox.y0
    }
}
