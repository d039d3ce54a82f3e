//! Axis-aligned bounding box shared by words, markers, and labels.
//!
//! The Y axis grows downward, matching PDF page coordinates as yielded by
//! the tokenizer: `y0` is the top of the box, `y1` the bottom.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// `top := y0` per spec §3.
    pub fn top(&self) -> f32 {
        self.y0
    }

    pub fn bottom(&self) -> f32 {
        self.y1
    }
}
