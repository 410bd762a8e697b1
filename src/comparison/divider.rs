//! Divider position and the state derived from it.
//!
//! The foreground layer is revealed on the left of the divider: a position
//! of `p` percent shows the foreground over `[0, p]` of the container width
//! and the background over `[p, 100]`.

pub const DIVIDER_MIN: f64 = 0.0;
pub const DIVIDER_MAX: f64 = 100.0;
pub const DIVIDER_DEFAULT: f64 = 50.0;

/// Divider position as percentage of the container width.
///
/// Always within `[0, 100]` and never NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DividerPosition(f64);

impl DividerPosition {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(DIVIDER_MIN, DIVIDER_MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn fraction(self) -> f64 {
        self.0 / DIVIDER_MAX
    }

    /// Offset of the divider line in pixels for a container of `width` pixels.
    pub fn offset_in(self, width: f64) -> f64 {
        if width.is_finite() && width > 0.0 {
            width * self.fraction()
        } else {
            0.0
        }
    }
}

impl Default for DividerPosition {
    fn default() -> Self {
        Self(DIVIDER_DEFAULT)
    }
}

impl From<f64> for DividerPosition {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Option<f64>> for DividerPosition {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }
}

/// Audio gains applied to the two surfaces while unmuted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixLevels {
    pub background: f64,
    pub foreground: f64,
}

impl MixLevels {
    pub fn for_position(position: DividerPosition) -> Self {
        let foreground = position.fraction();
        Self {
            background: 1.0 - foreground,
            foreground,
        }
    }
}

/// Visible part of the foreground layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRegion {
    /// Percentage of the width, measured from the left edge, showing the foreground.
    pub revealed: f64,
    /// Percentage of the width, measured from the right edge, hiding the foreground.
    pub inset_right: f64,
}

impl ClipRegion {
    pub fn for_position(position: DividerPosition) -> Self {
        Self {
            revealed: position.value(),
            inset_right: DIVIDER_MAX - position.value(),
        }
    }

    pub fn revealed_width(&self, width: f64) -> f64 {
        DividerPosition::new(self.revealed).offset_in(width)
    }

    pub fn is_hidden(&self) -> bool {
        self.revealed <= DIVIDER_MIN
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.revealed >= DIVIDER_MAX
    }
}
