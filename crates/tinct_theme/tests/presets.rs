use tinct_theme::{default_theme, theme_to_css, HexColor, Theme, ThemeField, ThemePreset};

#[test]
fn preset_catalog_contains_expected_presets() {
    let mut ids: Vec<&str> = ThemePreset::all().iter().map(|p| p.id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["dark", "light", "purple", "solarized"]);
}

#[test]
fn preset_ids_round_trip() {
    for preset in ThemePreset::all() {
        assert_eq!(ThemePreset::from_id(preset.id()), Some(*preset));
    }
    assert_eq!(ThemePreset::from_id("Solarized"), None);
}

#[test]
fn presets_use_readable_text_color() {
    for preset in ThemePreset::all() {
        let theme = preset.theme();
        assert_eq!(
            theme.text_color,
            theme.background_color.contrast_color(),
            "preset={preset:?}"
        );
    }
}

#[test]
fn preset_payloads_rebuild_the_preset() {
    for preset in ThemePreset::all() {
        let rebuilt = Theme::from_partial(&preset.payload()).unwrap();
        assert_eq!(rebuilt, preset.theme(), "preset={preset:?}");
    }
}

#[test]
fn default_theme_is_slate_with_white_text() {
    let theme = default_theme();
    assert_eq!(theme.background_color.as_str(), "#0f172a");
    assert_eq!(theme.text_color, HexColor::WHITE);
    let css = theme_to_css(&theme);
    for field in ThemeField::ALL {
        assert!(css.contains(field.css_var()), "missing {field}");
    }
}
