//! FrameWatch - dashboard engine for a remote camera-monitoring service.
//!
//! Polls the service's REST API on independent timers, normalizes the
//! polymorphic stored-detection data, renders dashboard regions and serves
//! the assembled page on a local port.

pub mod api;
pub mod app;
pub mod config;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod render;
pub mod sched;
pub mod web;
