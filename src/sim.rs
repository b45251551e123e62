//! # Headless Scene
//!
//! In-memory implementations of the scene collaborators: one camera, a flat
//! list of models with a selection, and a command log. The binary runs the
//! dispatch loop against these when no host application is attached, and
//! the tests use them to observe motion.

use std::collections::{BTreeSet, HashSet};

use glam::{DAffine3, DVec3};
use tracing::debug;

use crate::actions::rotation_about;
use crate::error::CommandError;
use crate::scene::{CommandSink, HostContext, ModelParent, Projection, SceneModel, SceneView, SelectionProvider};

/// Camera orbiting a pivot point.
#[derive(Debug, Clone)]
pub struct SimView {
    camera: DAffine3,
    pivot: DVec3,
    projection: Projection,
    field_width: f64,
    pixel_size: Option<f64>,
    content_offset: DVec3,
    /// Every `(axis, degrees)` passed to `rotate`
    pub rotations: Vec<(DVec3, f64)>,
    /// Number of `mark_redraw_needed` calls
    pub redraw_requests: usize,
}

impl SimView {
    pub const DEFAULT_CAMERA: DAffine3 = DAffine3::IDENTITY;

    fn with_projection(projection: Projection, field_width: f64, pixel_size: Option<f64>) -> Self {
        Self {
            camera: Self::DEFAULT_CAMERA,
            pivot: DVec3::ZERO,
            projection,
            field_width,
            pixel_size,
            content_offset: DVec3::ZERO,
            rotations: Vec::new(),
            redraw_requests: 0,
        }
    }

    pub fn orthographic(field_width: f64, pixel_size: Option<f64>) -> Self {
        Self::with_projection(Projection::Orthographic, field_width, pixel_size)
    }

    pub fn perspective(pixel_size: Option<f64>) -> Self {
        Self::with_projection(Projection::Perspective, 0.0, pixel_size)
    }

    pub fn set_camera_pose(&mut self, pose: DAffine3) {
        self.camera = pose;
    }

    /// Orbit center used by `rotate`.
    pub fn set_pivot(&mut self, pivot: DVec3) {
        self.pivot = pivot;
    }

    /// Sum of every shift passed to `translate`.
    pub fn content_offset(&self) -> DVec3 {
        self.content_offset
    }
}

impl SceneView for SimView {
    fn camera_pose(&self) -> DAffine3 {
        self.camera
    }

    fn rotate(&mut self, axis: DVec3, angle_degrees: f64) {
        self.rotations.push((axis, angle_degrees));
        if let Some(rotation) = rotation_about(axis, angle_degrees, self.pivot) {
            self.camera = rotation * self.camera;
        }
    }

    fn translate(&mut self, shift: DVec3) {
        // Moving the content is moving the camera the other way
        self.content_offset += shift;
        self.camera = DAffine3::from_translation(-shift) * self.camera;
    }

    fn pixel_size(&self) -> Option<f64> {
        self.pixel_size
    }

    fn projection(&self) -> Projection {
        self.projection
    }

    fn field_width(&self) -> f64 {
        self.field_width
    }

    fn set_field_width(&mut self, width: f64) {
        self.field_width = width;
    }

    fn mark_redraw_needed(&mut self) {
        self.redraw_requests += 1;
    }
}

/// A rigid object with an optional bounding box center.
#[derive(Debug, Clone)]
pub struct SimModel {
    pub name: String,
    pose: DAffine3,
    /// Bounding center in object space
    pub bounds: Option<DVec3>,
    pub parent: ModelParent,
}

impl SimModel {
    pub fn new(name: impl Into<String>, position: DVec3) -> Self {
        Self {
            name: name.into(),
            pose: DAffine3::from_translation(position),
            bounds: Some(DVec3::ZERO),
            parent: ModelParent::SceneRoot,
        }
    }

    /// Unnamed model at `position`, bounded around its origin.
    pub fn at(position: DVec3) -> Self {
        Self::new("model", position)
    }

    pub fn position(&self) -> DVec3 {
        self.pose.translation
    }
}

impl SceneModel for SimModel {
    fn pose(&self) -> DAffine3 {
        self.pose
    }

    fn set_pose(&mut self, pose: DAffine3) {
        self.pose = pose;
    }

    fn bounding_center(&self) -> Option<DVec3> {
        self.bounds.map(|center| self.pose.transform_point3(center))
    }

    fn parent(&self) -> ModelParent {
        self.parent
    }
}

/// Model list plus the indices currently selected.
#[derive(Debug, Default)]
pub struct SimSelection {
    models: Vec<SimModel>,
    selected: BTreeSet<usize>,
    /// Number of `selected_models` calls
    pub queries: usize,
}

impl SimSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unselected model and returns its index.
    pub fn add(&mut self, model: SimModel) -> usize {
        self.models.push(model);
        self.models.len() - 1
    }

    pub fn select(&mut self, index: usize) {
        if index < self.models.len() {
            self.selected.insert(index);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn model(&self, index: usize) -> Option<&SimModel> {
        self.models.get(index)
    }

    pub fn models(&self) -> &[SimModel] {
        &self.models
    }
}

impl SelectionProvider for SimSelection {
    fn selected_models(&mut self) -> Vec<&mut dyn SceneModel> {
        self.queries += 1;
        let selected = &self.selected;
        self.models
            .iter_mut()
            .enumerate()
            .filter(|(index, _)| selected.contains(index))
            .map(|(_, model)| model as &mut dyn SceneModel)
            .collect()
    }
}

/// Records every command; commands in `failing` return an error.
#[derive(Debug, Default)]
pub struct CommandLog {
    pub executed: Vec<String>,
    pub failing: HashSet<String>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandSink for CommandLog {
    fn run(&mut self, command: &str) -> Result<(), CommandError> {
        self.executed.push(command.to_string());
        if self.failing.contains(command) {
            return Err(CommandError::new(format!("command '{}' failed", command)));
        }
        debug!("Ran command '{}'", command);
        Ok(())
    }
}

/// The three collaborators bundled for one dispatcher.
#[derive(Debug)]
pub struct SimHost {
    pub view: SimView,
    pub selection: SimSelection,
    pub commands: CommandLog,
}

impl SimHost {
    pub fn new(view: SimView) -> Self {
        Self {
            view,
            selection: SimSelection::new(),
            commands: CommandLog::new(),
        }
    }

    /// Per-frame context borrowing all three collaborators.
    pub fn context(&mut self) -> HostContext<'_> {
        HostContext::new(&mut self.view, &mut self.selection, &mut self.commands)
    }
}
