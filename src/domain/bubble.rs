// Immutable bubble values shared by drivers, the board, and snapshots.

/// Packed `0xAARRGGBB` color. The core only carries it through; picking colors is
/// left to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BubbleColor(pub u32);

impl BubbleColor {
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    pub const BLACK: Self = Self(0xFF00_0000);
}

/// One bubble at one moment. Coordinates are in the virtual (bordered) surface.
///
/// Values are never mutated in place; every change produces a new state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleState {
    pub color: BubbleColor,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Direction of travel in radians.
    pub heading: f32,
}

impl BubbleState {
    pub fn new(color: BubbleColor, x: f32, y: f32, radius: f32, heading: f32) -> Self {
        Self {
            color,
            x,
            y,
            radius,
            heading,
        }
    }

    pub fn with_position(self, x: f32, y: f32) -> Self {
        Self { x, y, ..self }
    }

    pub fn with_color(self, color: BubbleColor) -> Self {
        Self { color, ..self }
    }

    pub fn with_heading(self, heading: f32) -> Self {
        Self { heading, ..self }
    }

    /// Squared distance between centers.
    pub fn distance_sq(&self, other: &BubbleState) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Two bubbles touch when the distance between centers is at most the sum of radii.
    pub fn touches(&self, other: &BubbleState) -> bool {
        let reach = self.radius + other.radius;
        self.distance_sq(other) <= reach * reach
    }

    /// Absorbs `prey`, keeping this bubble's position, heading, and color.
    ///
    /// Growth preserves area and is capped at `max_radius`. A bubble already above the
    /// cap keeps its radius instead of shrinking.
    pub fn consume(self, prey: &BubbleState, max_radius: f32) -> Self {
        let grown = (self.radius * self.radius + prey.radius * prey.radius).sqrt();
        let radius = grown.min(max_radius).max(self.radius);
        Self { radius, ..self }
    }
}
