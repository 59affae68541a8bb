//! Pan/zoom viewport for the preview pane.
//!
//! The [`ViewportState`] tracks zoom, pan offset and pointer-drag state.
//! It only changes through [`ViewportState::apply`], a pure reducer over
//! [`ViewportEvent`]s, so the drag state machine can be tested without a
//! terminal.
//!
//! # Example
//!
//! ```
//! use mermaid_pad::ui::viewport::{Point, ViewportEvent, ViewportState, WheelDirection};
//!
//! let vp = ViewportState::new()
//!     .apply(ViewportEvent::PointerDown(Point::new(10, 5)))
//!     .apply(ViewportEvent::PointerMove(Point::new(14, 7)))
//!     .apply(ViewportEvent::PointerUp)
//!     .apply(ViewportEvent::Wheel(WheelDirection::Down));
//!
//! assert_eq!(vp.pan(), Point::new(4, 2));
//! assert_eq!(vp.zoom_percent(), 90);
//! ```

use std::ops::{Add, Sub};

/// Smallest allowed zoom, in percent.
pub const MIN_ZOOM_PERCENT: u16 = 50;
/// Largest allowed zoom, in percent.
pub const MAX_ZOOM_PERCENT: u16 = 200;
/// Zoom change for one wheel notch or zoom button press, in percent.
pub const ZOOM_STEP_PERCENT: u16 = 10;
const DEFAULT_ZOOM_PERCENT: u16 = 100;

/// A pointer position or pan offset, in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

/// Whether a pointer drag is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging; `anchor` is the last pointer position seen.
    Dragging { anchor: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// Input to the viewport reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    /// Primary button pressed inside the preview.
    PointerDown(Point),
    /// Pointer moved inside the preview.
    PointerMove(Point),
    /// Primary button released.
    PointerUp,
    /// Pointer left the preview.
    PointerLeave,
    /// One wheel notch over the preview.
    Wheel(WheelDirection),
    ZoomIn,
    ZoomOut,
    /// Pan by a fixed offset (keyboard panning).
    Nudge(Point),
    /// Back to 100% zoom and no pan.
    Reset,
}

/// Zoom, pan and drag state of the preview pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    zoom_percent: u16,
    pan: Point,
    drag: DragState,
}

impl ViewportState {
    pub const fn new() -> Self {
        Self {
            zoom_percent: DEFAULT_ZOOM_PERCENT,
            pan: Point::ORIGIN,
            drag: DragState::Idle,
        }
    }

    /// Zoom factor in `[0.5, 2.0]`.
    pub fn zoom(&self) -> f64 {
        f64::from(self.zoom_percent) / 100.0
    }

    /// Zoom as the percentage shown in the UI.
    pub const fn zoom_percent(&self) -> u16 {
        self.zoom_percent
    }

    pub const fn pan(&self) -> Point {
        self.pan
    }

    pub const fn drag(&self) -> DragState {
        self.drag
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Apply one event and return the next state.
    ///
    /// Pan accumulates the delta between consecutive pointer positions, so a
    /// drag from `P0` through `P1..Pn` moves the pan by exactly `Pn - P0`.
    /// Once the pointer is released or leaves the preview, further moves are
    /// ignored until the next `PointerDown`.
    #[must_use]
    pub fn apply(mut self, event: ViewportEvent) -> Self {
        match event {
            ViewportEvent::PointerDown(at) => {
                self.drag = DragState::Dragging { anchor: at };
            }
            ViewportEvent::PointerMove(at) => {
                if let DragState::Dragging { anchor } = self.drag {
                    self.pan = self.pan + (at - anchor);
                    self.drag = DragState::Dragging { anchor: at };
                }
            }
            ViewportEvent::PointerUp | ViewportEvent::PointerLeave => {
                self.drag = DragState::Idle;
            }
            ViewportEvent::Wheel(WheelDirection::Up) | ViewportEvent::ZoomIn => {
                self.zoom_percent = step_zoom(self.zoom_percent, true);
            }
            ViewportEvent::Wheel(WheelDirection::Down) | ViewportEvent::ZoomOut => {
                self.zoom_percent = step_zoom(self.zoom_percent, false);
            }
            ViewportEvent::Nudge(by) => {
                self.pan = self.pan + by;
            }
            ViewportEvent::Reset => {
                self = Self::new();
            }
        }
        self
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new()
    }
}

const fn step_zoom(current: u16, zoom_in: bool) -> u16 {
    let next = if zoom_in {
        current.saturating_add(ZOOM_STEP_PERCENT)
    } else {
        current.saturating_sub(ZOOM_STEP_PERCENT)
    };
    if next < MIN_ZOOM_PERCENT {
        MIN_ZOOM_PERCENT
    } else if next > MAX_ZOOM_PERCENT {
        MAX_ZOOM_PERCENT
    } else {
        next
    }
}

/// Width and height in some display unit (cells or pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Where the scaled content lands inside the viewport area.
///
/// The content is centered on the area, shifted by the pan offset and scaled
/// about its own center, so zooming keeps the diagram centered rather than
/// growing from its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Left edge of the scaled content, relative to the area.
    pub left: f64,
    /// Top edge of the scaled content, relative to the area.
    pub top: f64,
    pub scale: f64,
}

impl ViewTransform {
    /// Compute the transform for `content` shown in `area`.
    ///
    /// `cell` converts the pan offset (in terminal cells) into the unit of
    /// `area` and `content`; pass `Extent::new(1.0, 1.0)` when both are
    /// already in cells.
    pub fn for_viewport(
        area: Extent,
        content: Extent,
        cell: Extent,
        state: &ViewportState,
    ) -> Self {
        let scale = state.zoom();
        let pan = state.pan();
        let center_x = area.width / 2.0 + f64::from(pan.x) * cell.width;
        let center_y = area.height / 2.0 + f64::from(pan.y) * cell.height;
        Self {
            left: center_x - content.width * scale / 2.0,
            top: center_y - content.height * scale / 2.0,
            scale,
        }
    }

    /// Size of `content` after scaling.
    pub fn scaled(&self, content: Extent) -> Extent {
        Extent::new(content.width * self.scale, content.height * self.scale)
    }
}
