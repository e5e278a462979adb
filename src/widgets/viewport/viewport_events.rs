//! Viewport widget events.

use crate::entities::Direction;

#[derive(Clone, Debug)]
pub struct ResetViewportEvent;

#[derive(Clone, Debug)]
pub struct FitViewportEvent;

#[derive(Clone, Debug)]
pub struct Viewport100Event;

#[derive(Clone, Debug)]
pub struct FlipHorizontalEvent;

#[derive(Clone, Debug)]
pub struct FlipVerticalEvent;

/// Arrow key in screen space; the app mirrors it by the current flips.
#[derive(Clone, Debug)]
pub struct ScreenNudgeEvent(pub Direction);

#[derive(Clone, Debug)]
pub struct ToggleOverlayEvent;
