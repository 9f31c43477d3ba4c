//! Events delivered to the GTK main loop.

/// Polling groups, each driven by its own timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTier {
    /// Sliders, media controls, Wi-Fi, interface and Bluetooth rows.
    Fast,
    /// Battery row.
    Slow,
    /// CLI output label.
    Cli,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Refresh(RefreshTier),
    ConfigReload,
    CssReload,
}
