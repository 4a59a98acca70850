//! src/model/ui_state.rs
//! ============================================================================
//! # UIState: Focus, Overlays, Page Messages, Redraw Flags

use compact_str::CompactString;
use smallvec::SmallVec;

/// Redraw flags, ORed together between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RedrawFlag {
    Main = 1,
    StatusBar = 2,
    Overlay = 4,
    All = 7,
}

impl RedrawFlag {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Which part of the form owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The destination-user picker.
    #[default]
    ToUser,
    /// A criteria row's field picker.
    CriteriaField(u32),
    /// A criteria row's operator picker.
    CriteriaOperator(u32),
    /// A criteria row's value cell (free text or user lookup).
    CriteriaValue(u32),
    /// The results table.
    Contacts,
}

/// Full-screen overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Overlay {
    #[default]
    None = 0,
    Help = 1,
}

/// Severity of a page message, in increasing weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Severity {
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

/// One banner line at the top of the screen.
#[derive(Debug, Clone)]
pub struct PageMessage {
    pub severity: Severity,
    pub text: CompactString,
}

impl PageMessage {
    pub fn new(severity: Severity, text: impl Into<CompactString>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Interactive-surface state that belongs to no one workflow.
#[derive(Debug)]
pub struct UIState {
    pub focus: Focus,
    pub overlay: Overlay,
    pub messages: SmallVec<[PageMessage; 4]>,
    pub spinner_frame: u8,
    max_messages: usize,
    redraw: u8,
}

impl UIState {
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self {
            focus: Focus::default(),
            overlay: Overlay::default(),
            messages: SmallVec::new(),
            spinner_frame: 0,
            max_messages: max_messages.max(1),
            redraw: RedrawFlag::All.bits(),
        }
    }

    /// Advances the in-flight spinner by one animation frame.
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        self.request_redraw(RedrawFlag::Overlay);
    }

    /// Queues a banner; the oldest one falls off past the cap.
    pub fn push_message(&mut self, severity: Severity, text: impl Into<CompactString>) {
        self.messages.push(PageMessage::new(severity, text));
        while self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
        self.request_redraw(RedrawFlag::Main);
    }

    pub fn dismiss_messages(&mut self) {
        self.messages.clear();
        self.request_redraw(RedrawFlag::Main);
    }

    pub fn request_redraw(&mut self, flag: RedrawFlag) {
        self.redraw |= flag.bits();
    }

    #[must_use]
    pub const fn needs_redraw(&self) -> bool {
        self.redraw != 0
    }

    pub fn clear_redraw(&mut self) {
        self.redraw = 0;
    }
}

impl Default for UIState {
    fn default() -> Self {
        Self::new(4)
    }
}
