use shelf_types::Theme;

/// Reads the dark-mode flag from `localStorage`.
#[cfg(feature = "hydrate")]
pub fn load_theme() -> Theme {
    let stored = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(shelf_types::DARK_MODE_KEY).ok().flatten());
    Theme::from_stored(stored.as_deref())
}

#[cfg(not(feature = "hydrate"))]
pub fn load_theme() -> Theme {
    Theme::default()
}

/// Persists the flag and toggles the `dark` class on the document element.
#[cfg(feature = "hydrate")]
pub fn apply_theme(theme: Theme) {
    let Some(window) = web_sys::window() else {
        return;
    };

    if let Some(storage) = window.local_storage().ok().flatten() {
        let _ = storage.set_item(shelf_types::DARK_MODE_KEY, theme.as_stored());
    }

    if let Some(root) = window.document().and_then(|d| d.document_element()) {
        let _ = root.class_list().toggle_with_force("dark", theme.is_dark());
    }
}

#[cfg(not(feature = "hydrate"))]
pub fn apply_theme(_theme: Theme) {}
