//! # Scene Collaborators
//!
//! Contracts for the host-owned pieces the core drives: the camera/view,
//! the selection, individual models and the command runner.
//!
//! Poses are rigid transforms (`DAffine3`) from object space to scene space.
//! A camera pose maps camera-space vectors (x right, y up, looking down -z)
//! into scene space.

use glam::{DAffine3, DVec3};

use crate::error::CommandError;

/// Camera projection kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Orthographic,
    Perspective,
}

/// The shared camera and view of the host.
pub trait SceneView {
    /// Current camera orientation and position
    fn camera_pose(&self) -> DAffine3;

    /// Rotate the view about a scene-space axis
    fn rotate(&mut self, axis: DVec3, angle_degrees: f64);

    /// Shift the scene content by a scene-space vector
    fn translate(&mut self, shift: DVec3);

    /// Scene units per screen pixel, if known
    fn pixel_size(&self) -> Option<f64>;

    fn projection(&self) -> Projection;

    /// Visible width in scene units (orthographic only)
    fn field_width(&self) -> f64;

    fn set_field_width(&mut self, width: f64);

    fn mark_redraw_needed(&mut self);
}

/// Where a model hangs in the scene hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelParent {
    /// Not attached to anything
    Detached,
    /// Direct child of the scene root container
    SceneRoot,
    /// Child of another model
    Nested,
}

/// One positionable scene object.
pub trait SceneModel {
    fn pose(&self) -> DAffine3;

    fn set_pose(&mut self, pose: DAffine3);

    /// Center of the bounding volume in scene coordinates
    fn bounding_center(&self) -> Option<DVec3>;

    fn parent(&self) -> ModelParent;

    /// Top-level models are moved directly; nested ones follow their parent.
    fn is_top_level(&self) -> bool {
        matches!(self.parent(), ModelParent::Detached | ModelParent::SceneRoot)
    }
}

/// The host's current selection.
pub trait SelectionProvider {
    fn selected_models(&mut self) -> Vec<&mut dyn SceneModel>;
}

/// Runs host command strings bound to buttons.
#[cfg_attr(test, mockall::automock)]
pub trait CommandSink {
    fn run(&mut self, command: &str) -> Result<(), CommandError>;
}

/// Everything the dispatcher touches during one frame tick.
pub struct HostContext<'a> {
    pub view: &'a mut dyn SceneView,
    pub selection: &'a mut dyn SelectionProvider,
    pub commands: &'a mut dyn CommandSink,
}

impl<'a> HostContext<'a> {
    pub fn new(
        view: &'a mut dyn SceneView,
        selection: &'a mut dyn SelectionProvider,
        commands: &'a mut dyn CommandSink,
    ) -> Self {
        Self {
            view,
            selection,
            commands,
        }
    }
}

/// Selected models that are safe to move: no parent, or the scene root.
pub fn eligible_top_level_models(selection: &mut dyn SelectionProvider) -> Vec<&mut dyn SceneModel> {
    selection
        .selected_models()
        .into_iter()
        .filter(|model| model.is_top_level())
        .collect()
}
