//! Pointer Driver Interface
//!
//! The composer drives an injected backend through this trait. Drivers
//! must be non-blocking, must not coalesce positions, and must not
//! reorder or drop events; everything else (OS APIs, virtual devices,
//! remote protocols) is the backend's business.

use async_trait::async_trait;

use crate::trace::MouseButton;
use crate::Result;

/// The operations the core requires from a pointer backend.
#[async_trait]
pub trait PointerDriver: Send + Sync {
    /// Move the pointer to absolute screen coordinates.
    async fn move_to(&self, x: f64, y: f64) -> Result<()>;

    /// Press a button at the current position.
    async fn button_down(&self, button: MouseButton) -> Result<()>;

    /// Release a button at the current position.
    async fn button_up(&self, button: MouseButton) -> Result<()>;

    /// Scroll by a wheel delta.
    async fn scroll(&self, dx: f64, dy: f64) -> Result<()>;
}

/// A driver that accepts everything and does nothing. Useful for dry
/// runs, trace generation without hardware, and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDriver;

#[async_trait]
impl PointerDriver for NullDriver {
    async fn move_to(&self, _x: f64, _y: f64) -> Result<()> {
        Ok(())
    }

    async fn button_down(&self, _button: MouseButton) -> Result<()> {
        Ok(())
    }

    async fn button_up(&self, _button: MouseButton) -> Result<()> {
        Ok(())
    }

    async fn scroll(&self, _dx: f64, _dy: f64) -> Result<()> {
        Ok(())
    }
}
