//! Whole-frame integration tests
//!
//! These drive a complete [`Engine`](crate::Engine) with a manual clock and an
//! in-memory render target.

mod frame_integration;
