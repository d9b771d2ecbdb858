//! Platform-specific configuration

use crossterm::event::KeyModifiers;

/// Platform-appropriate modifier for tool shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Copy result shortcut display
#[cfg(target_os = "macos")]
pub const COPY_SHORTCUT: &str = "Cmd+Y";

#[cfg(not(target_os = "macos"))]
pub const COPY_SHORTCUT: &str = "Ctrl+Y";

/// Reset shortcut display
#[cfg(target_os = "macos")]
pub const RESET_SHORTCUT: &str = "Cmd+R";

#[cfg(not(target_os = "macos"))]
pub const RESET_SHORTCUT: &str = "Ctrl+R";

/// Generate shortcut display
#[cfg(target_os = "macos")]
pub const GENERATE_SHORTCUT: &str = "Cmd+G";

#[cfg(not(target_os = "macos"))]
pub const GENERATE_SHORTCUT: &str = "Ctrl+G";

/// Export shortcut display
#[cfg(target_os = "macos")]
pub const EXPORT_SHORTCUT: &str = "Cmd+E";

#[cfg(not(target_os = "macos"))]
pub const EXPORT_SHORTCUT: &str = "Ctrl+E";

/// Remove row shortcut display
#[cfg(target_os = "macos")]
pub const REMOVE_ROW_SHORTCUT: &str = "Cmd+D";

#[cfg(not(target_os = "macos"))]
pub const REMOVE_ROW_SHORTCUT: &str = "Ctrl+D";
