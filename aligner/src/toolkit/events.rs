use serde::{Deserialize, Serialize};

use crate::panel::PanelStatus;

/// Which of the two panels an operation targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PanelId {
    Left,
    Right,
}

impl PanelId {
    pub const ALL: [PanelId; 2] = [PanelId::Left, PanelId::Right];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PanelId::Left => 0,
            PanelId::Right => 1,
        }
    }

    #[inline]
    pub const fn other(self) -> PanelId {
        match self {
            PanelId::Left => PanelId::Right,
            PanelId::Right => PanelId::Left,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Info,
    Warning,
    Error,
    Success,
}

/// User-facing diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub msg: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(kind: MessageKind, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind,
        }
    }
}

/// Output observed by the host, in the order things happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolkitEvent {
    StatusChanged { panel: PanelId, status: PanelStatus },
    /// Working buffer or dimension rectangles changed; redraw.
    BufferUpdated { panel: PanelId },
    Message { panel: PanelId, message: Message },
}
