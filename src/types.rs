use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// A bounding box defined by top-left corner, width, and height.
///
/// Face detectors report boxes normalized to [0,1] relative to the image;
/// [`BoundingBox::to_pixel_rect`] maps one back onto a concrete image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert a point from normalized coordinates [0,1] to image coordinates
    /// within this bounding box.
    pub fn denormalize_point(&self, p: Point) -> Point {
        Point::new(self.x + p.x * self.width, self.y + p.y * self.height)
    }

    /// Convert a point from image coordinates to normalized [0,1] coordinates
    /// relative to this bounding box.
    pub fn normalize_point(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.x) / self.width,
            (p.y - self.y) / self.height,
        )
    }

    /// Pixel rectangle `(x, y, width, height)` covered by this normalized box
    /// on an image of the given size. Clamped to the image and at least 1x1.
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let img_w = image_width as f32;
        let img_h = image_height as f32;

        let px = ((self.x.max(0.0) * img_w) as u32).min(image_width.saturating_sub(1));
        let py = ((self.y.max(0.0) * img_h) as u32).min(image_height.saturating_sub(1));
        let pw = ((self.width.max(0.0) * img_w) as u32)
            .min(image_width.saturating_sub(px))
            .max(1);
        let ph = ((self.height.max(0.0) * img_h) as u32)
            .min(image_height.saturating_sub(py))
            .max(1);

        (px, py, pw, ph)
    }
}

/// Head orientation reported by the face detector, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl HeadPose {
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }
}
