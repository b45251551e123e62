//! # Action Appliers
//!
//! Turn one frame of normalized controller input into scene motion.
//!
//! | Input | View mode | Model mode |
//! |-------|-----------|------------|
//! | Right stick X | orbit about camera up | rotate models about camera up |
//! | Right stick Y | orbit about camera right | rotate models about camera right |
//! | Left stick | pan | translate models in the screen plane |
//! | Right - left trigger | zoom | translate models along the view axis |
//!
//! Every delta is applied once per frame tick; nothing here keeps state
//! between frames.

pub mod model;
pub mod view;

pub use model::ModelAction;
pub use view::ViewAction;

use glam::{DAffine3, DVec3};

use crate::scene::SceneView;

/// Inputs with a magnitude below this are treated as zero.
pub const IDLE_EPSILON: f64 = 0.001;

/// Normalized input of one controller for one frame.
///
/// Sticks are in `-1.0..=1.0` after the dead zone, Y down-positive. `zoom`
/// is right trigger minus left trigger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameSample {
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
    pub right_y: f64,
    pub zoom: f64,
}

impl FrameSample {
    /// `true` when every input is within [`IDLE_EPSILON`] of rest.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        [self.left_x, self.left_y, self.right_x, self.right_y, self.zoom]
            .iter()
            .all(|v| v.abs() < IDLE_EPSILON)
    }

    pub(crate) fn rotating(&self) -> bool {
        active(self.right_x) || active(self.right_y)
    }

    pub(crate) fn panning(&self) -> bool {
        active(self.left_x) || active(self.left_y)
    }

    pub(crate) fn zooming(&self) -> bool {
        active(self.zoom)
    }
}

/// Per-frame tuning constants.
///
/// The ratios between them matter more than the absolute values: zoom is a
/// little slower than pan, and model depth translation is three times the
/// screen-plane translation so forward/back stays responsive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionScales {
    /// Degrees per frame at full stick deflection
    pub angle: f64,
    /// Pixels per frame at full deflection, view pan
    pub pan: f64,
    /// Pixels per frame at full trigger, view zoom
    pub zoom: f64,
    /// Pixels per frame at full deflection, model translation
    pub translate: f64,
    /// Pixels per frame at full trigger, model depth translation
    pub translate_z: f64,
}

impl Default for MotionScales {
    fn default() -> Self {
        Self {
            angle: 2.0,
            pan: 20.0,
            zoom: 15.0,
            translate: 20.0,
            translate_z: 60.0,
        }
    }
}

#[inline]
pub(crate) fn active(value: f64) -> bool {
    value.abs() > IDLE_EPSILON
}

/// Scene units per pixel, defaulting to `1.0` when the view cannot tell.
pub(crate) fn pixel_size(view: &dyn SceneView) -> f64 {
    view.pixel_size().unwrap_or(1.0)
}

/// Screen-plane shift in camera space; screen-down is scene-up, so Y flips.
pub(crate) fn screen_shift(x: f64, y: f64, speed: f64) -> DVec3 {
    DVec3::new(x * speed, -y * speed, 0.0)
}

/// Camera-space up axis expressed in scene space.
pub(crate) fn camera_up(camera: &DAffine3) -> DVec3 {
    camera.transform_vector3(DVec3::Y)
}

/// Camera-space right axis expressed in scene space.
pub(crate) fn camera_right(camera: &DAffine3) -> DVec3 {
    camera.transform_vector3(DVec3::X)
}

/// Rotation by `angle_degrees` about `axis` through `center`.
///
/// Returns `None` for a degenerate axis.
pub fn rotation_about(axis: DVec3, angle_degrees: f64, center: DVec3) -> Option<DAffine3> {
    let axis = axis.try_normalize()?;
    Some(
        DAffine3::from_translation(center)
            * DAffine3::from_axis_angle(axis, angle_degrees.to_radians())
            * DAffine3::from_translation(-center),
    )
}
