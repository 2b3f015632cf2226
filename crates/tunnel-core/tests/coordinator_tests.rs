// Host-side tests for the effect coordinator: gestures, timed effects,
// collapse and theme switching, driven with synthetic frame times.

use glam::Vec2;
use std::time::Duration;
use tunnel_core::audio::{PlaybackState, SoftBackend};
use tunnel_core::camera::Section;
use tunnel_core::config::TunnelConfig;
use tunnel_core::coordinator::EffectCoordinator;
use tunnel_core::error::AudioError;
use tunnel_core::schedule::TaskKey;
use tunnel_core::Theme;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn sections() -> Vec<Section> {
    (0..6).map(|i| Section { depth: -(i as f32) * 1_500.0 }).collect()
}

fn make(config: TunnelConfig) -> (EffectCoordinator<SoftBackend>, SoftBackend) {
    let backend = SoftBackend::new(8_000.0);
    let handle = backend.clone();
    let coord = EffectCoordinator::new(config, sections(), Some(Vec2::new(800.0, 600.0)), move || Ok(handle));
    (coord, backend)
}

#[test]
fn audio_waits_for_first_gesture() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    coord.tick(ms(0));
    assert_eq!(coord.audio().state(), PlaybackState::Idle);

    let handle = coord.handle();
    handle.gesture();
    coord.tick(ms(16));
    assert!(coord.audio().is_playing());
    assert_eq!(coord.audio().theme(), Theme::Main);
}

#[test]
fn later_gestures_do_not_restart_audio() {
    let (mut coord, backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.gesture();
    coord.tick(ms(0));
    let nodes = backend.live_nodes();
    handle.gesture();
    handle.gesture();
    coord.tick(ms(16));
    assert_eq!(backend.live_nodes(), nodes);
    assert_eq!(coord.audio().active_groups().len(), 5);
}

#[test]
fn muted_config_never_starts_audio() {
    let mut config = TunnelConfig::default();
    config.audio.muted = true;
    let (mut coord, backend) = make(config);
    coord.handle().gesture();
    coord.tick(ms(0));
    assert!(!coord.audio().is_playing());
    assert_eq!(backend.live_nodes(), 0);
}

#[test]
fn wind_layer_joins_the_theme() {
    let mut config = TunnelConfig::default();
    config.audio.wind_volume = Some(0.05);
    let (mut coord, _backend) = make(config);
    coord.handle().gesture();
    coord.tick(ms(0));
    assert_eq!(coord.audio().active_groups().len(), 6);
}

#[test]
fn nova_bursts_for_800ms() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    coord.handle().fire_nova();
    let report = coord.tick(ms(1_000));
    assert!(report.bursting);
    assert!(coord.tick(ms(1_799)).bursting);
    assert!(!coord.tick(ms(1_800)).bursting);
}

#[test]
fn refiring_glitch_extends_it() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.fire_glitch();
    assert!(coord.tick(ms(0)).glitch);
    handle.fire_glitch();
    assert!(coord.tick(ms(300)).glitch);
    // The first clear at 500ms was replaced by one at 800ms.
    assert!(coord.tick(ms(600)).glitch);
    assert!(!coord.tick(ms(800)).glitch);
    assert!(!coord.is_glitching());
}

#[test]
fn effects_play_transients_only_with_audio_running() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.fire_glitch();
    coord.tick(ms(0));
    assert_eq!(coord.audio().transient_count(), 0);

    handle.gesture();
    coord.tick(ms(16));
    handle.fire_glitch();
    handle.fire_nova();
    coord.tick(ms(32));
    assert_eq!(coord.audio().transient_count(), 2);
}

#[test]
fn scroll_moves_camera_and_sections() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.scroll(375.0); // target 1500
    let mut report = coord.tick(ms(0));
    for i in 1..400 {
        report = coord.tick(ms(i * 16));
    }
    assert!((report.depth - 1_500.0).abs() < 1.0);
    assert!(!report.invert);

    let visuals = coord.visuals();
    assert_eq!(visuals.len(), 6);
    // Section at -1500 now sits at view depth ~0.
    assert!(visuals[1].opacity > 0.99);
    assert!(visuals[0].opacity < 0.01);
}

#[test]
fn deep_scroll_enters_invert_band() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    coord.handle().scroll(2_000.0); // target 8000
    let mut report = coord.tick(ms(0));
    for i in 1..400 {
        report = coord.tick(ms(i * 16));
    }
    assert!(report.invert);
}

#[test]
fn collapse_stops_audio_and_navigates_once() {
    let (mut coord, backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.gesture();
    coord.tick(ms(0));
    assert!(coord.audio().is_playing());

    handle.collapse();
    let report = coord.tick(ms(100));
    assert_eq!(report.collapse_progress, Some(0.0));
    assert_eq!(coord.audio().state(), PlaybackState::Stopping);
    assert!(coord.tasks().is_pending(TaskKey::AudioReap));
    assert!(coord.tasks().is_pending(TaskKey::Navigate));

    // A second collapse click does not push the deadlines back.
    handle.collapse();
    let mid = coord.tick(ms(1_350));
    assert!((mid.collapse_progress.unwrap_or_default() - 0.5).abs() < 1e-3);
    assert_eq!(coord.audio().state(), PlaybackState::Idle);
    assert_eq!(backend.live_nodes(), 1);

    assert_eq!(coord.tick(ms(2_599)).navigate, None);
    let done = coord.tick(ms(2_600));
    assert_eq!(done.navigate.as_deref(), Some("contact.html"));
    assert_eq!(done.collapse_progress, Some(1.0));
    assert_eq!(coord.tick(ms(2_700)).navigate, None);
}

#[test]
fn gestures_after_collapse_do_not_start_audio() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.collapse();
    coord.tick(ms(0));
    handle.gesture();
    coord.tick(ms(16));
    assert!(!coord.audio().is_playing());
}

#[test]
fn collapse_target_comes_from_config() {
    let mut config = TunnelConfig::default();
    config.collapse.target = "elsewhere.html".into();
    let (mut coord, _backend) = make(config);
    coord.handle().collapse();
    coord.tick(ms(0));
    assert_eq!(coord.tick(ms(2_500)).navigate.as_deref(), Some("elsewhere.html"));
}

#[test]
fn toggle_theme_crossfades_after_reap() {
    let (mut coord, backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.gesture();
    coord.tick(ms(0));

    handle.toggle_theme();
    coord.tick(ms(1_000));
    assert_eq!(coord.audio().state(), PlaybackState::Stopping);

    coord.tick(ms(2_099));
    assert_eq!(coord.audio().state(), PlaybackState::Stopping);
    coord.tick(ms(2_100));
    assert!(coord.audio().is_playing());
    assert_eq!(coord.audio().theme(), Theme::Choice);
    assert_eq!(coord.audio().active_groups().len(), 4);
    assert_eq!(coord.config().audio.theme, Theme::Choice);
    assert_eq!(backend.live_nodes(), 1 + 3 + 3 + 5 + 5);
}

#[test]
fn toggle_before_any_gesture_only_changes_the_theme() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    let handle = coord.handle();
    handle.toggle_theme();
    coord.tick(ms(0));
    assert!(!coord.audio().is_playing());
    handle.gesture();
    coord.tick(ms(16));
    assert_eq!(coord.audio().theme(), Theme::Choice);
}

#[test]
fn missing_vortex_surface_skips_the_field() {
    let backend = SoftBackend::new(8_000.0);
    let handle = backend.clone();
    let mut coord = EffectCoordinator::new(TunnelConfig::default(), sections(), None, move || Ok(handle));
    coord.handle().fire_nova();
    let report = coord.tick(ms(0));
    assert!(coord.field().is_none());
    assert!(!report.bursting);
    assert_eq!(coord.visuals().len(), 6);
}

#[test]
fn missing_audio_backend_is_silent() {
    let mut coord: EffectCoordinator<SoftBackend> = EffectCoordinator::new(
        TunnelConfig::default(),
        sections(),
        Some(Vec2::new(800.0, 600.0)),
        || Err(AudioError::Unavailable("no AudioContext".into())),
    );
    let handle = coord.handle();
    handle.gesture();
    handle.fire_nova();
    handle.collapse();
    coord.tick(ms(0));
    assert!(!coord.audio().is_playing());
    assert!(coord.audio().is_unavailable());
    assert!(!coord.tasks().is_pending(TaskKey::AudioReap));
    assert_eq!(coord.tick(ms(2_500)).navigate.as_deref(), Some("contact.html"));
}

#[test]
fn resize_recenters_the_field() {
    let (mut coord, _backend) = make(TunnelConfig::default());
    coord.resize(Vec2::new(1_000.0, 400.0));
    let center = coord.field().map(|f| f.center());
    assert_eq!(center, Some(Vec2::new(500.0, 200.0)));
}
