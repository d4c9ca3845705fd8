//! Core engine services: configuration, frame scheduling and task tracking

pub mod config;
pub mod frame_scheduler;
pub mod tasks;

pub use config::{DevConfig, EngineConfig, GameConfig, GraphicsConfig};
pub use frame_scheduler::{FrameCallback, FrameScheduler, SchedulerState};
pub use tasks::{TaskEvent, TaskId, TaskTracker};
