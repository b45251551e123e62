//! # View Action
//!
//! Drives the shared camera: right stick orbits, left stick pans, the
//! trigger axis zooms.

use glam::DVec3;
use tracing::trace;

use super::{active, camera_right, camera_up, pixel_size, screen_shift, FrameSample, MotionScales};
use crate::config::GamepadConfig;
use crate::scene::{Projection, SceneView};

/// Applies one frame of input to the camera.
#[derive(Debug, Clone, Default)]
pub struct ViewAction {
    scales: MotionScales,
}

impl ViewAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scales(scales: MotionScales) -> Self {
        Self { scales }
    }

    pub fn scales(&self) -> &MotionScales {
        &self.scales
    }

    /// Moves the camera for one frame.
    ///
    /// Rotation uses `rotation_sensitivity`, pan `translation_sensitivity`
    /// and zoom `zoom_sensitivity`. Horizontal and vertical orbit are two
    /// separate rotations, horizontal first, both about axes taken from the
    /// camera as it was before this frame.
    ///
    /// # Returns
    ///
    /// `false` if the sample was idle and the view was not touched.
    pub fn apply(&self, sample: &FrameSample, config: &GamepadConfig, view: &mut dyn SceneView) -> bool {
        if sample.is_idle() {
            return false;
        }

        let camera = view.camera_pose();
        let pixel = pixel_size(view);

        if sample.rotating() {
            let speed = config.rotation_sensitivity() * self.scales.angle;
            if active(sample.right_x) {
                view.rotate(camera_up(&camera), sample.right_x * speed);
            }
            if active(sample.right_y) {
                view.rotate(camera_right(&camera), sample.right_y * speed);
            }
        }

        if sample.panning() {
            let speed = self.scales.pan * config.translation_sensitivity() * pixel;
            let shift = screen_shift(sample.left_x, sample.left_y, speed);
            view.translate(camera.transform_vector3(shift));
        }

        if sample.zooming() {
            let delta = sample.zoom * self.scales.zoom * config.zoom_sensitivity() * pixel;
            match view.projection() {
                Projection::Orthographic => {
                    let width = (view.field_width() - delta).max(pixel);
                    view.set_field_width(width);
                    view.mark_redraw_needed();
                }
                Projection::Perspective => {
                    view.translate(camera.transform_vector3(DVec3::new(0.0, 0.0, delta)));
                }
            }
        }

        trace!("View moved by {:?}", sample);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimView;
    use glam::{DAffine3, DQuat};

    fn sample(left: (f64, f64), right: (f64, f64), zoom: f64) -> FrameSample {
        FrameSample {
            left_x: left.0,
            left_y: left.1,
            right_x: right.0,
            right_y: right.1,
            zoom,
        }
    }

    // ==== Zoom Tests ====

    #[test]
    fn test_orthographic_zoom_out_widens_field() {
        let mut view = SimView::orthographic(10.0, Some(0.1));
        let applied = ViewAction::new().apply(&sample((0.0, 0.0), (0.0, 0.0), -1.0), &GamepadConfig::default(), &mut view);

        assert!(applied);
        assert!((view.field_width() - 11.5).abs() < 1e-9);
        assert_eq!(view.redraw_requests, 1);
    }

    #[test]
    fn test_orthographic_zoom_never_collapses_field() {
        let mut view = SimView::orthographic(0.5, Some(0.1));
        let mut config = GamepadConfig::default();
        config.set_zoom_sensitivity(5.0);

        ViewAction::new().apply(&sample((0.0, 0.0), (0.0, 0.0), 1.0), &config, &mut view);
        assert_eq!(view.field_width(), 0.1);
    }

    #[test]
    fn test_perspective_zoom_moves_camera_forward() {
        let mut view = SimView::perspective(None);
        let before = view.camera_pose().translation;

        ViewAction::new().apply(&sample((0.0, 0.0), (0.0, 0.0), 1.0), &GamepadConfig::default(), &mut view);

        // Camera looks down -Z; forward by 15 units at the default pixel size
        let after = view.camera_pose().translation;
        assert!((after - before).abs_diff_eq(DVec3::new(0.0, 0.0, -15.0), 1e-9));
        assert_eq!(view.redraw_requests, 0);
    }

    // ==== Pan Tests ====

    #[test]
    fn test_pan_flips_vertical_and_scales_by_pixel_size() {
        let mut view = SimView::perspective(Some(0.5));
        let mut config = GamepadConfig::default();
        config.set_translation_sensitivity(2.0);

        ViewAction::new().apply(&sample((1.0, 1.0), (0.0, 0.0), 0.0), &config, &mut view);

        // 1.0 * 20 * 2.0 * 0.5 = 20 right, and stick-down moves content up
        assert!(view
            .content_offset()
            .abs_diff_eq(DVec3::new(20.0, -20.0, 0.0), 1e-9));
    }

    #[test]
    fn test_pan_follows_camera_orientation() {
        let mut view = SimView::perspective(None);
        view.set_camera_pose(DAffine3::from_rotation_y(std::f64::consts::FRAC_PI_2));

        ViewAction::new().apply(&sample((1.0, 0.0), (0.0, 0.0), 0.0), &GamepadConfig::default(), &mut view);

        // Camera right is scene -Z after a quarter turn about Y
        assert!(view
            .content_offset()
            .abs_diff_eq(DVec3::new(0.0, 0.0, -20.0), 1e-9));
    }

    // ==== Rotation Tests ====

    #[test]
    fn test_rotation_is_horizontal_then_vertical() {
        let mut view = SimView::perspective(None);
        ViewAction::new().apply(&sample((0.0, 0.0), (1.0, 0.5), 0.0), &GamepadConfig::default(), &mut view);

        let horizontal = DQuat::from_axis_angle(DVec3::Y, 2.0_f64.to_radians());
        let vertical = DQuat::from_axis_angle(DVec3::X, 1.0_f64.to_radians());
        let expected = DAffine3::from_quat(vertical * horizontal) * SimView::DEFAULT_CAMERA;

        assert!(view.camera_pose().abs_diff_eq(expected, 1e-9));
        assert_eq!(view.rotations.len(), 2);
    }

    #[test]
    fn test_rotation_sensitivity_scales_angle() {
        let mut view = SimView::perspective(None);
        let mut config = GamepadConfig::default();
        config.set_rotation_sensitivity(3.0);

        ViewAction::new().apply(&sample((0.0, 0.0), (-0.5, 0.0), 0.0), &config, &mut view);

        let (axis, angle) = view.rotations[0];
        assert!(axis.abs_diff_eq(DVec3::Y, 1e-12));
        assert!((angle + 3.0).abs() < 1e-12);
    }

    // ==== Idle Tests ====

    #[test]
    fn test_idle_sample_touches_nothing() {
        let mut view = SimView::orthographic(10.0, Some(0.1));
        let applied = ViewAction::new().apply(&sample((0.0005, 0.0), (0.0, -0.0009), 0.0), &GamepadConfig::default(), &mut view);

        assert!(!applied);
        assert!(view.rotations.is_empty());
        assert_eq!(view.field_width(), 10.0);
        assert_eq!(view.content_offset(), DVec3::ZERO);
    }

    #[test]
    fn test_custom_scales() {
        let scales = MotionScales {
            pan: 1.0,
            ..MotionScales::default()
        };
        let mut view = SimView::perspective(None);
        ViewAction::with_scales(scales).apply(&sample((1.0, 0.0), (0.0, 0.0), 0.0), &GamepadConfig::default(), &mut view);

        assert!(view.content_offset().abs_diff_eq(DVec3::X, 1e-12));
    }
}
