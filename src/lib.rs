//! # Padview Library
//!
//! Drive a 3D viewport or the selected scene models with a game controller.
//!
//! The host application owns the render loop, the scene and the UI. Once per
//! frame it calls [`dispatch::InputDispatcher::update`], which drains
//! connect/disconnect/button events, reads every connected controller and
//! turns the sticks and triggers into camera or model motion.

pub mod actions;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod mode;
pub mod scene;
pub mod sim;
