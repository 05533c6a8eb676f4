use serde::{Deserialize, Serialize};

/// Browser storage key holding the dark-mode flag.
pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Only the literal `"true"` selects dark mode.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("true") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn as_stored(&self) -> &'static str {
        match self {
            Theme::Light => "false",
            Theme::Dark => "true",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_flag_parsing() {
        assert_eq!(Theme::from_stored(Some("true")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("false")), Theme::Light);
        assert_eq!(Theme::from_stored(Some("TRUE")), Theme::Light);
        assert_eq!(Theme::from_stored(None), Theme::Light);
    }

    #[test]
    fn toggle_flips_stored_value() {
        let theme = Theme::Light.toggled();
        assert!(theme.is_dark());
        assert_eq!(theme.as_stored(), "true");
        assert_eq!(theme.toggled(), Theme::Light);
    }
}
