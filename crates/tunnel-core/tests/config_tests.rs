// Host-side tests for TOML configuration parsing and validation.

use tunnel_core::config::TunnelConfig;
use tunnel_core::constants::{DEFAULT_PARTICLE_COUNT, MASTER_LEVEL, MAX_DEPTH, SCROLL_GAIN};
use tunnel_core::error::ConfigError;
use tunnel_core::Theme;

#[test]
fn defaults_are_valid() {
    let cfg = TunnelConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.camera.max_depth, MAX_DEPTH);
    assert_eq!(cfg.camera.scroll_gain, SCROLL_GAIN);
    assert_eq!(cfg.particles.count, DEFAULT_PARTICLE_COUNT);
    assert_eq!(cfg.audio.master_level, MASTER_LEVEL);
    assert_eq!(cfg.audio.theme, Theme::Main);
    assert_eq!(cfg.audio.wind_volume, None);
    assert!(!cfg.audio.muted);
    assert_eq!(cfg.collapse.target, "contact.html");
}

#[test]
fn empty_document_yields_defaults() {
    let cfg = TunnelConfig::from_toml_str("").expect("empty config parses");
    assert_eq!(cfg.seed, TunnelConfig::default().seed);
    assert_eq!(cfg.particles.count, DEFAULT_PARTICLE_COUNT);
}

#[test]
fn partial_document_overrides_only_named_keys() {
    let src = r#"
        seed = 7

        [particles]
        count = 600

        [audio]
        theme = "choice"
        wind_volume = 0.05
    "#;
    let cfg = TunnelConfig::from_toml_str(src).expect("valid config");
    assert_eq!(cfg.seed, 7);
    assert_eq!(cfg.particles.count, 600);
    assert_eq!(cfg.audio.theme, Theme::Choice);
    assert_eq!(cfg.audio.wind_volume, Some(0.05));
    assert_eq!(cfg.audio.master_level, MASTER_LEVEL);
    assert_eq!(cfg.camera.max_depth, MAX_DEPTH);
}

#[test]
fn unknown_theme_is_a_parse_error() {
    let err = TunnelConfig::from_toml_str("[audio]\ntheme = \"loud\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases = [
        ("[particles]\ncount = 0\n", "particles.count"),
        ("[particles]\ncount = 50000\n", "particles.count"),
        ("[camera]\nmax_depth = -1.0\n", "camera.max_depth"),
        ("[camera]\nscroll_gain = 0.0\n", "camera.scroll_gain"),
        ("[audio]\nmaster_level = 1.5\n", "audio.master_level"),
        ("[audio]\nwind_volume = -0.1\n", "audio.wind_volume"),
    ];
    for (src, expected) in cases {
        match TunnelConfig::from_toml_str(src) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "for {src:?}"),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}

#[test]
fn round_trips_through_toml() {
    let mut cfg = TunnelConfig::default();
    cfg.audio.theme = Theme::Choice;
    cfg.audio.muted = true;
    let text = toml::to_string(&cfg).expect("serializes");
    assert!(text.contains("theme = \"choice\""));
    let back = TunnelConfig::from_toml_str(&text).expect("parses back");
    assert_eq!(back.audio.theme, Theme::Choice);
    assert!(back.audio.muted);
}
