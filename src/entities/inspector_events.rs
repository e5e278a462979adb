//! Inspector events emitted by widgets, menus and hotkeys.

use std::path::PathBuf;

use super::inspector::Direction;
use super::layers::LayerKind;
use super::pick::Interpretation;
use super::region::Point;

/// Open a color image. `None` asks the user with a file dialog.
#[derive(Clone, Debug)]
pub struct OpenImageEvent(pub Option<PathBuf>);

/// Open a NN field. `None` asks the user with a file dialog.
#[derive(Clone, Debug)]
pub struct OpenFieldEvent(pub Option<PathBuf>);

/// Files dropped on the window, routed by extension.
#[derive(Clone, Debug)]
pub struct FilesDroppedEvent(pub Vec<PathBuf>);

/// Pixel clicked in the viewport.
#[derive(Clone, Debug)]
pub struct PickEvent(pub Point);

/// Move the last pick by one pixel (image space).
#[derive(Clone, Debug)]
pub struct NudgePickEvent(pub Direction);

/// Text dropped or pasted: "x y [...]".
#[derive(Clone, Debug)]
pub struct DropTextEvent(pub String);

/// Copy "pick_x pick_y match_x match_y" to the clipboard.
#[derive(Clone, Debug)]
pub struct CopyPickEvent;

#[derive(Clone, Debug)]
pub struct SetInterpretationEvent(pub Interpretation);

#[derive(Clone, Debug)]
pub struct SetPatchRadiusEvent(pub u32);

#[derive(Clone, Debug)]
pub struct SelectLayerEvent(pub LayerKind);
