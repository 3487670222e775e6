//! Command vocabulary
//!
//! The closed set of intents the voice pipeline understands, the typed
//! command union the router dispatches on, and the phrase reference shown
//! to users as help.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of intent identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    VoiceHelp,
    SelectBubble,
    ToggleConnectMode,
    SetConnectModeOn,
    SetConnectModeOff,
    ClearMap,
    StartPlayback,
    StopPlayback,
    PausePlayback,
    ResumePlayback,
    Undo,
    Redo,
    AddBubble,
    DeleteSelectedBubble,
    LockSelectedBubble,
    UnlockSelectedBubble,
    SnapCenter,
    OpenPromptModal,
    OpenVoiceSettings,
    CloseVoiceSettings,
    SetQuestionIntent,
    SetTaskIntent,
    SetNoteIntent,
    SetBlockerIntent,
    SetIdeaIntent,
    CreateBubble,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::VoiceHelp => "voice_help",
            Intent::SelectBubble => "select_bubble",
            Intent::ToggleConnectMode => "toggle_connect_mode",
            Intent::SetConnectModeOn => "set_connect_mode_on",
            Intent::SetConnectModeOff => "set_connect_mode_off",
            Intent::ClearMap => "clear_map",
            Intent::StartPlayback => "start_playback",
            Intent::StopPlayback => "stop_playback",
            Intent::PausePlayback => "pause_playback",
            Intent::ResumePlayback => "resume_playback",
            Intent::Undo => "undo",
            Intent::Redo => "redo",
            Intent::AddBubble => "add_bubble",
            Intent::DeleteSelectedBubble => "delete_selected_bubble",
            Intent::LockSelectedBubble => "lock_selected_bubble",
            Intent::UnlockSelectedBubble => "unlock_selected_bubble",
            Intent::SnapCenter => "snap_center",
            Intent::OpenPromptModal => "open_prompt_modal",
            Intent::OpenVoiceSettings => "open_voice_settings",
            Intent::CloseVoiceSettings => "close_voice_settings",
            Intent::SetQuestionIntent => "set_question_intent",
            Intent::SetTaskIntent => "set_task_intent",
            Intent::SetNoteIntent => "set_note_intent",
            Intent::SetBlockerIntent => "set_blocker_intent",
            Intent::SetIdeaIntent => "set_idea_intent",
            Intent::CreateBubble => "create_bubble",
        }
    }

    /// Intents whose effect cannot be trivially undone
    pub fn is_destructive(self) -> bool {
        matches!(self, Intent::ClearMap | Intent::DeleteSelectedBubble)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bubble types that can be announced with a leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleKind {
    Question,
    Task,
    Note,
    Blocker,
    Idea,
}

impl BubbleKind {
    pub const ALL: [BubbleKind; 5] = [
        BubbleKind::Question,
        BubbleKind::Task,
        BubbleKind::Note,
        BubbleKind::Blocker,
        BubbleKind::Idea,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            BubbleKind::Question => "question",
            BubbleKind::Task => "task",
            BubbleKind::Note => "note",
            BubbleKind::Blocker => "blocker",
            BubbleKind::Idea => "idea",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    pub fn intent(self) -> Intent {
        match self {
            BubbleKind::Question => Intent::SetQuestionIntent,
            BubbleKind::Task => Intent::SetTaskIntent,
            BubbleKind::Note => Intent::SetNoteIntent,
            BubbleKind::Blocker => Intent::SetBlockerIntent,
            BubbleKind::Idea => Intent::SetIdeaIntent,
        }
    }
}

/// A classified command with its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum VoiceCommand {
    VoiceHelp,
    /// 0-based index (the user speaks 1-based numbers)
    SelectBubble { bubble_index: usize },
    ToggleConnectMode,
    SetConnectModeOn,
    SetConnectModeOff,
    ClearMap,
    StartPlayback,
    StopPlayback,
    PausePlayback,
    ResumePlayback,
    Undo,
    Redo,
    AddBubble { transcript: Option<String> },
    DeleteSelectedBubble,
    LockSelectedBubble,
    UnlockSelectedBubble,
    SnapCenter,
    OpenPromptModal,
    OpenVoiceSettings,
    CloseVoiceSettings,
    /// Sets the pending bubble type; `remainder` keeps the speaker's casing
    SetType { kind: BubbleKind, remainder: String },
}

impl VoiceCommand {
    pub fn intent(&self) -> Intent {
        match self {
            VoiceCommand::VoiceHelp => Intent::VoiceHelp,
            VoiceCommand::SelectBubble { .. } => Intent::SelectBubble,
            VoiceCommand::ToggleConnectMode => Intent::ToggleConnectMode,
            VoiceCommand::SetConnectModeOn => Intent::SetConnectModeOn,
            VoiceCommand::SetConnectModeOff => Intent::SetConnectModeOff,
            VoiceCommand::ClearMap => Intent::ClearMap,
            VoiceCommand::StartPlayback => Intent::StartPlayback,
            VoiceCommand::StopPlayback => Intent::StopPlayback,
            VoiceCommand::PausePlayback => Intent::PausePlayback,
            VoiceCommand::ResumePlayback => Intent::ResumePlayback,
            VoiceCommand::Undo => Intent::Undo,
            VoiceCommand::Redo => Intent::Redo,
            VoiceCommand::AddBubble { .. } => Intent::AddBubble,
            VoiceCommand::DeleteSelectedBubble => Intent::DeleteSelectedBubble,
            VoiceCommand::LockSelectedBubble => Intent::LockSelectedBubble,
            VoiceCommand::UnlockSelectedBubble => Intent::UnlockSelectedBubble,
            VoiceCommand::SnapCenter => Intent::SnapCenter,
            VoiceCommand::OpenPromptModal => Intent::OpenPromptModal,
            VoiceCommand::OpenVoiceSettings => Intent::OpenVoiceSettings,
            VoiceCommand::CloseVoiceSettings => Intent::CloseVoiceSettings,
            VoiceCommand::SetType { kind, .. } => kind.intent(),
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.intent().is_destructive()
    }

    /// Command for an intent that takes no arguments.
    ///
    /// Intents that need arguments (bubble selection, typed intents,
    /// dictation) return `None`. `AddBubble` maps to an empty bubble.
    pub fn without_args(intent: Intent) -> Option<Self> {
        let command = match intent {
            Intent::VoiceHelp => VoiceCommand::VoiceHelp,
            Intent::ToggleConnectMode => VoiceCommand::ToggleConnectMode,
            Intent::SetConnectModeOn => VoiceCommand::SetConnectModeOn,
            Intent::SetConnectModeOff => VoiceCommand::SetConnectModeOff,
            Intent::ClearMap => VoiceCommand::ClearMap,
            Intent::StartPlayback => VoiceCommand::StartPlayback,
            Intent::StopPlayback => VoiceCommand::StopPlayback,
            Intent::PausePlayback => VoiceCommand::PausePlayback,
            Intent::ResumePlayback => VoiceCommand::ResumePlayback,
            Intent::Undo => VoiceCommand::Undo,
            Intent::Redo => VoiceCommand::Redo,
            Intent::AddBubble => VoiceCommand::AddBubble { transcript: None },
            Intent::DeleteSelectedBubble => VoiceCommand::DeleteSelectedBubble,
            Intent::LockSelectedBubble => VoiceCommand::LockSelectedBubble,
            Intent::UnlockSelectedBubble => VoiceCommand::UnlockSelectedBubble,
            Intent::SnapCenter => VoiceCommand::SnapCenter,
            Intent::OpenPromptModal => VoiceCommand::OpenPromptModal,
            Intent::OpenVoiceSettings => VoiceCommand::OpenVoiceSettings,
            Intent::CloseVoiceSettings => VoiceCommand::CloseVoiceSettings,
            Intent::SelectBubble
            | Intent::SetQuestionIntent
            | Intent::SetTaskIntent
            | Intent::SetNoteIntent
            | Intent::SetBlockerIntent
            | Intent::SetIdeaIntent
            | Intent::CreateBubble => return None,
        };
        Some(command)
    }
}

/// Exact phrases (after normalization) that trigger argument-free commands
pub const COMMAND_ALIASES: &[(Intent, &[&str])] = &[
    (
        Intent::VoiceHelp,
        &["help", "voice help", "command list", "commands", "what can i say"],
    ),
    (Intent::ToggleConnectMode, &["connect mode", "toggle connect mode"]),
    (
        Intent::SetConnectModeOn,
        &["connect mode on", "enable connect mode", "start connect mode"],
    ),
    (
        Intent::SetConnectModeOff,
        &["connect mode off", "disable connect mode", "stop connect mode"],
    ),
    (Intent::ClearMap, &["clear", "clear map", "reset map"]),
    (
        Intent::StartPlayback,
        &["play", "start playback", "playback start", "play map"],
    ),
    (Intent::StopPlayback, &["stop", "stop playback", "playback stop"]),
    (Intent::PausePlayback, &["pause", "pause playback"]),
    (Intent::ResumePlayback, &["resume", "resume playback"]),
    (Intent::Undo, &["undo", "undo last change"]),
    (Intent::Redo, &["redo", "redo last change"]),
    (Intent::AddBubble, &["add bubble", "new bubble", "create bubble"]),
    (
        Intent::DeleteSelectedBubble,
        &["delete bubble", "delete selected bubble", "remove bubble"],
    ),
    (Intent::LockSelectedBubble, &["lock bubble", "lock selected bubble"]),
    (
        Intent::UnlockSelectedBubble,
        &["unlock bubble", "unlock selected bubble"],
    ),
    (Intent::SnapCenter, &["snap center", "center map", "center view"]),
    (Intent::OpenPromptModal, &["open prompt", "create from prompt"]),
    (
        Intent::OpenVoiceSettings,
        &["voice settings", "open voice settings"],
    ),
    (Intent::CloseVoiceSettings, &["close voice settings"]),
];

/// Look up an exact alias
pub fn alias_command(phrase: &str) -> Option<VoiceCommand> {
    COMMAND_ALIASES
        .iter()
        .find(|(_, phrases)| phrases.contains(&phrase))
        .and_then(|(intent, _)| VoiceCommand::without_args(*intent))
}

/// One row of the user-facing help table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReferenceEntry {
    pub intent: Intent,
    pub phrases: &'static [&'static str],
}

const COMMAND_REFERENCE: &[CommandReferenceEntry] = &[
    CommandReferenceEntry {
        intent: Intent::VoiceHelp,
        phrases: &["help", "voice help", "command list", "what can i say"],
    },
    CommandReferenceEntry {
        intent: Intent::SelectBubble,
        phrases: &["bubble 3", "select bubble 3", "focus bubble 3", "go to bubble 3"],
    },
    CommandReferenceEntry {
        intent: Intent::ToggleConnectMode,
        phrases: &["connect mode", "toggle connect mode"],
    },
    CommandReferenceEntry {
        intent: Intent::SetConnectModeOn,
        phrases: &["connect mode on", "enable connect mode", "start connect mode"],
    },
    CommandReferenceEntry {
        intent: Intent::SetConnectModeOff,
        phrases: &["connect mode off", "disable connect mode", "stop connect mode"],
    },
    CommandReferenceEntry {
        intent: Intent::ClearMap,
        phrases: &["clear", "clear map", "reset map"],
    },
    CommandReferenceEntry {
        intent: Intent::StartPlayback,
        phrases: &["play", "start playback", "play map"],
    },
    CommandReferenceEntry {
        intent: Intent::StopPlayback,
        phrases: &["stop", "stop playback"],
    },
    CommandReferenceEntry {
        intent: Intent::PausePlayback,
        phrases: &["pause", "pause playback"],
    },
    CommandReferenceEntry {
        intent: Intent::ResumePlayback,
        phrases: &["resume", "resume playback"],
    },
    CommandReferenceEntry {
        intent: Intent::Undo,
        phrases: &["undo"],
    },
    CommandReferenceEntry {
        intent: Intent::Redo,
        phrases: &["redo"],
    },
    CommandReferenceEntry {
        intent: Intent::AddBubble,
        phrases: &["add bubble", "new bubble", "create bubble"],
    },
    CommandReferenceEntry {
        intent: Intent::DeleteSelectedBubble,
        phrases: &["delete bubble", "delete selected bubble"],
    },
    CommandReferenceEntry {
        intent: Intent::LockSelectedBubble,
        phrases: &["lock bubble", "lock selected bubble"],
    },
    CommandReferenceEntry {
        intent: Intent::UnlockSelectedBubble,
        phrases: &["unlock bubble", "unlock selected bubble"],
    },
    CommandReferenceEntry {
        intent: Intent::SnapCenter,
        phrases: &["snap center", "center map", "center view"],
    },
    CommandReferenceEntry {
        intent: Intent::OpenPromptModal,
        phrases: &["open prompt", "create from prompt"],
    },
    CommandReferenceEntry {
        intent: Intent::OpenVoiceSettings,
        phrases: &["voice settings", "open voice settings"],
    },
    CommandReferenceEntry {
        intent: Intent::CloseVoiceSettings,
        phrases: &["close voice settings"],
    },
    CommandReferenceEntry {
        intent: Intent::SetQuestionIntent,
        phrases: &["question <text>"],
    },
    CommandReferenceEntry {
        intent: Intent::SetTaskIntent,
        phrases: &["task <text>"],
    },
    CommandReferenceEntry {
        intent: Intent::SetNoteIntent,
        phrases: &["note <text>"],
    },
    CommandReferenceEntry {
        intent: Intent::SetBlockerIntent,
        phrases: &["blocker <text>"],
    },
    CommandReferenceEntry {
        intent: Intent::SetIdeaIntent,
        phrases: &["idea <text>"],
    },
];

/// Help table of spoken commands
pub fn command_reference() -> &'static [CommandReferenceEntry] {
    COMMAND_REFERENCE
}
