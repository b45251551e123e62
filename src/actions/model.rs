//! # Model Action
//!
//! Moves the selected top-level models relative to the camera. Rotation
//! pivots each model about its own bounding center; translation applies one
//! shared delta to every model.

use glam::{DAffine3, DVec3};
use tracing::trace;

use super::{
    active, camera_right, camera_up, pixel_size, rotation_about, screen_shift, FrameSample, MotionScales,
};
use crate::config::GamepadConfig;
use crate::scene::{eligible_top_level_models, SceneModel, SceneView, SelectionProvider};

/// Applies one frame of input to the selected models.
#[derive(Debug, Clone, Default)]
pub struct ModelAction {
    scales: MotionScales,
}

impl ModelAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scales(scales: MotionScales) -> Self {
        Self { scales }
    }

    pub fn scales(&self) -> &MotionScales {
        &self.scales
    }

    /// Moves every eligible selected model for one frame.
    ///
    /// Only models without a parent or parented to the scene root are
    /// moved; nested models follow their parent.
    ///
    /// # Returns
    ///
    /// `false` if the sample was idle or nothing eligible was selected.
    pub fn apply(
        &self,
        sample: &FrameSample,
        config: &GamepadConfig,
        view: &dyn SceneView,
        selection: &mut dyn SelectionProvider,
    ) -> bool {
        if sample.is_idle() {
            return false;
        }

        let mut models = eligible_top_level_models(selection);
        if models.is_empty() {
            return false;
        }

        let camera = view.camera_pose();
        let pixel = pixel_size(view);

        if sample.rotating() {
            let speed = config.rotation_sensitivity() * self.scales.angle;
            let up = camera_up(&camera);
            let right = camera_right(&camera);
            for model in models.iter_mut() {
                let center = model.bounding_center().unwrap_or(DVec3::ZERO);
                let mut pose = model.pose();
                if active(sample.right_x) {
                    if let Some(rotation) = rotation_about(up, sample.right_x * speed, center) {
                        pose = rotation * pose;
                    }
                }
                if active(sample.right_y) {
                    if let Some(rotation) = rotation_about(right, sample.right_y * speed, center) {
                        pose = rotation * pose;
                    }
                }
                model.set_pose(pose);
            }
        }

        if sample.panning() {
            let speed = self.scales.translate * config.translation_sensitivity() * pixel;
            let shift = screen_shift(sample.left_x, sample.left_y, speed);
            translate_all(&mut models, camera.transform_vector3(shift));
        }

        if sample.zooming() {
            let depth = sample.zoom * self.scales.translate_z * config.zoom_sensitivity() * pixel;
            translate_all(&mut models, camera.transform_vector3(DVec3::new(0.0, 0.0, depth)));
        }

        trace!("Moved {} model(s) by {:?}", models.len(), sample);
        true
    }
}

fn translate_all(models: &mut [&mut dyn SceneModel], shift: DVec3) {
    let delta = DAffine3::from_translation(shift);
    for model in models.iter_mut() {
        let pose = model.pose();
        model.set_pose(delta * pose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ModelParent;
    use crate::sim::{SimModel, SimSelection, SimView};

    fn stick(left: (f64, f64), right: (f64, f64), zoom: f64) -> FrameSample {
        FrameSample {
            left_x: left.0,
            left_y: left.1,
            right_x: right.0,
            right_y: right.1,
            zoom,
        }
    }

    fn selection_of(models: Vec<SimModel>) -> SimSelection {
        let mut selection = SimSelection::new();
        for model in models {
            let index = selection.add(model);
            selection.select(index);
        }
        selection
    }

    // ==== Eligibility Tests ====

    #[test]
    fn test_empty_selection_is_noop() {
        let view = SimView::perspective(None);
        let mut selection = SimSelection::new();
        selection.add(SimModel::at(DVec3::ZERO));

        let applied = ModelAction::new().apply(&stick((1.0, 0.0), (0.0, 0.0), 0.0), &GamepadConfig::default(), &view, &mut selection);
        assert!(!applied);
        assert_eq!(selection.model(0).unwrap().pose(), DAffine3::IDENTITY);
    }

    #[test]
    fn test_nested_models_are_not_moved() {
        let view = SimView::perspective(None);
        let mut nested = SimModel::at(DVec3::ZERO);
        nested.parent = ModelParent::Nested;
        let mut rooted = SimModel::at(DVec3::ZERO);
        rooted.parent = ModelParent::SceneRoot;
        let mut selection = selection_of(vec![nested, rooted, SimModel::at(DVec3::ZERO)]);

        ModelAction::new().apply(&stick((1.0, 0.0), (0.0, 0.0), 0.0), &GamepadConfig::default(), &view, &mut selection);

        assert_eq!(selection.model(0).unwrap().pose(), DAffine3::IDENTITY);
        assert!(selection.model(1).unwrap().position().abs_diff_eq(DVec3::new(20.0, 0.0, 0.0), 1e-9));
        assert!(selection.model(2).unwrap().position().abs_diff_eq(DVec3::new(20.0, 0.0, 0.0), 1e-9));
    }

    #[test]
    fn test_only_nested_selected_is_noop() {
        let view = SimView::perspective(None);
        let mut nested = SimModel::at(DVec3::ZERO);
        nested.parent = ModelParent::Nested;
        let mut selection = selection_of(vec![nested]);

        let applied = ModelAction::new().apply(&stick((0.0, 0.0), (1.0, 0.0), 0.0), &GamepadConfig::default(), &view, &mut selection);
        assert!(!applied);
    }

    // ==== Translation Tests ====

    #[test]
    fn test_translation_is_shared_delta() {
        let view = SimView::perspective(Some(0.5));
        let mut selection = selection_of(vec![
            SimModel::at(DVec3::new(1.0, 2.0, 3.0)),
            SimModel::at(DVec3::new(-5.0, 0.0, 0.0)),
        ]);

        ModelAction::new().apply(&stick((0.0, 1.0), (0.0, 0.0), 0.0), &GamepadConfig::default(), &view, &mut selection);

        // Stick down moves models down the screen: 1.0 * 20 * 0.5
        assert!(selection.model(0).unwrap().position().abs_diff_eq(DVec3::new(1.0, -8.0, 3.0), 1e-9));
        assert!(selection.model(1).unwrap().position().abs_diff_eq(DVec3::new(-5.0, -10.0, 0.0), 1e-9));
    }

    #[test]
    fn test_depth_translation_uses_zoom_sensitivity() {
        let view = SimView::perspective(None);
        let mut config = GamepadConfig::default();
        config.set_zoom_sensitivity(0.5);
        config.set_translation_sensitivity(5.0);
        let mut selection = selection_of(vec![SimModel::at(DVec3::ZERO)]);

        ModelAction::new().apply(&stick((0.0, 0.0), (0.0, 0.0), -1.0), &config, &view, &mut selection);

        // -1.0 * 60 * 0.5 along camera +Z
        assert!(selection.model(0).unwrap().position().abs_diff_eq(DVec3::new(0.0, 0.0, -30.0), 1e-9));
    }

    // ==== Rotation Tests ====

    #[test]
    fn test_rotation_pivots_on_each_bounding_center() {
        let view = SimView::perspective(None);
        let mut selection = selection_of(vec![
            SimModel::at(DVec3::new(10.0, 0.0, 0.0)),
            SimModel::at(DVec3::new(0.0, 0.0, -4.0)),
        ]);
        let mut config = GamepadConfig::default();
        config.set_rotation_sensitivity(4.5);

        // 1.0 * 4.5 * 2 = 9 degrees about camera up
        ModelAction::new().apply(&stick((0.0, 0.0), (1.0, 0.0), 0.0), &config, &view, &mut selection);

        for index in 0..2 {
            let model = selection.model(index).unwrap();
            let center = model.bounding_center().unwrap();
            assert!(model.position().abs_diff_eq(center, 1e-9), "model {} drifted", index);
            let expected = DAffine3::from_rotation_y(9.0_f64.to_radians()).matrix3;
            assert!(model.pose().matrix3.abs_diff_eq(expected, 1e-9));
        }
    }

    #[test]
    fn test_rotation_without_bounds_uses_origin() {
        let view = SimView::perspective(None);
        let mut model = SimModel::at(DVec3::new(1.0, 0.0, 0.0));
        model.bounds = None;
        let mut selection = selection_of(vec![model]);
        let mut config = GamepadConfig::default();
        config.set_rotation_sensitivity(5.0);

        // 1.0 * 5.0 * 18 = 90 degrees about camera up
        let action = ModelAction::with_scales(MotionScales {
            angle: 18.0,
            ..MotionScales::default()
        });
        action.apply(&stick((0.0, 0.0), (1.0, 0.0), 0.0), &config, &view, &mut selection);

        assert!(selection
            .model(0)
            .unwrap()
            .position()
            .abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-9));
    }

    #[test]
    fn test_idle_skips_selection_query() {
        let view = SimView::perspective(None);
        let mut selection = selection_of(vec![SimModel::at(DVec3::ZERO)]);

        let applied = ModelAction::new().apply(&FrameSample::default(), &GamepadConfig::default(), &view, &mut selection);
        assert!(!applied);
        assert_eq!(selection.queries, 0);
    }
}
