// Host-side tests for the synthesis engine, rendered offline through the
// software backend.

use std::cell::Cell;
use std::rc::Rc;
use tunnel_core::audio::*;
use tunnel_core::error::AudioError;

const SR: f32 = 8_000.0;

fn make_engine() -> (SynthesisEngine<SoftBackend>, SoftBackend) {
    let backend = SoftBackend::new(SR);
    let handle = backend.clone();
    (SynthesisEngine::new(move || Ok(handle), 0.4, 42), backend)
}

/// Render `secs` of stereo audio and return its RMS.
fn render(backend: &SoftBackend, secs: f32) -> f32 {
    let frames = (secs * SR) as usize;
    let mut buf = vec![0.0f32; frames * 2];
    backend.render(&mut buf, 2);
    assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
    (buf.iter().map(|s| s * s).sum::<f32>() / buf.len() as f32).sqrt()
}

fn nodes_for(theme: Theme) -> usize {
    theme
        .voices()
        .iter()
        .map(|v| if v.lfo.is_some() { 5 } else { 3 })
        .sum()
}

#[test]
fn ramp_interpolates_linearly() {
    let r = Ramp::new(0.0, 0.4, 1.0, 3.0);
    assert_eq!(r.value_at(0.0), 0.0);
    assert!((r.value_at(2.5) - 0.2).abs() < 1e-6);
    assert_eq!(r.value_at(4.0), 0.4);
    assert_eq!(r.value_at(10.0), 0.4);
}

#[test]
fn automation_cancel_holds_current_value() {
    let mut a = Automation::new(0.0);
    a.push(Ramp::new(0.0, 1.0, 0.0, 2.0));
    a.cancel_from(1.0);
    assert!(a.ramps().is_empty());
    assert!((a.value_at(5.0) - 0.5).abs() < 1e-6);
}

#[test]
fn automation_push_supersedes_later_ramps() {
    let mut a = Automation::new(0.0);
    a.push(Ramp::new(0.0, 1.0, 0.0, 1.0));
    a.push(Ramp::new(1.0, 0.0, 2.0, 1.0));
    a.push(Ramp::new(1.0, 0.5, 1.5, 1.0));
    assert_eq!(a.ramps().len(), 2);
    assert!((a.value_at(5.0) - 0.5).abs() < 1e-6);
}

#[test]
fn main_theme_fades_in_and_sounds() {
    let (mut engine, backend) = make_engine();
    assert_eq!(engine.state(), PlaybackState::Idle);
    engine.start(Theme::Main);
    assert!(engine.is_playing());
    assert_eq!(engine.theme(), Theme::Main);
    assert_eq!(engine.active_groups().len(), 5);
    assert_eq!(backend.live_nodes(), 1 + nodes_for(Theme::Main));

    render(&backend, 1.5);
    let mid = engine.master_gain().unwrap_or_default();
    assert!((mid - 0.2).abs() < 0.01, "master at 1.5s = {mid}");

    render(&backend, 2.0);
    let level = engine.master_gain().unwrap_or_default();
    assert!((level - 0.4).abs() < 1e-4, "master after fade = {level}");
    let rms = render(&backend, 0.5);
    assert!(rms > 0.005, "theme is silent (rms {rms})");
}

#[test]
fn choice_theme_builds_four_voices() {
    let (mut engine, backend) = make_engine();
    engine.start(Theme::Choice);
    assert_eq!(engine.active_groups().len(), 4);
    assert_eq!(backend.live_nodes(), 1 + nodes_for(Theme::Choice));
}

#[test]
fn start_twice_keeps_one_graph() {
    let (mut engine, backend) = make_engine();
    engine.start(Theme::Main);
    let nodes = backend.live_nodes();
    engine.start(Theme::Main);
    engine.start(Theme::Choice);
    assert_eq!(engine.active_groups().len(), 5);
    assert_eq!(engine.theme(), Theme::Main);
    assert_eq!(backend.live_nodes(), nodes);
}

#[test]
fn stop_fades_out_then_reap_releases_nodes() {
    let (mut engine, backend) = make_engine();
    engine.start(Theme::Main);
    render(&backend, 3.2);

    assert!(engine.stop());
    assert_eq!(engine.state(), PlaybackState::Stopping);
    assert!(!engine.is_playing());
    assert!(engine.active_groups().is_empty());
    assert_eq!(engine.fading_groups().len(), 5);
    // Already stopping: nothing more to do.
    assert!(!engine.stop());

    render(&backend, 0.5);
    let half = engine.master_gain().unwrap_or_default();
    assert!((half - 0.2).abs() < 0.01, "master mid fade-out = {half}");
    render(&backend, 0.6);
    assert!(engine.master_gain().unwrap_or(1.0) < 1e-4);

    engine.reap();
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(engine.fading_groups().is_empty());
    assert_eq!(backend.live_nodes(), 1);
    assert!(render(&backend, 0.25) < 1e-6);
}

#[test]
fn stop_mid_fade_in_ramps_from_current_level() {
    let (mut engine, backend) = make_engine();
    engine.start(Theme::Main);
    render(&backend, 0.75); // master at 0.1
    engine.stop();
    render(&backend, 0.5);
    let g = engine.master_gain().unwrap_or_default();
    assert!((g - 0.05).abs() < 0.01, "master = {g}");
}

#[test]
fn restart_before_reap_yields_one_coherent_graph() {
    let (mut engine, backend) = make_engine();
    engine.start(Theme::Main);
    render(&backend, 0.5);
    engine.stop();
    render(&backend, 0.3);

    engine.start(Theme::Choice);
    assert!(engine.is_playing());
    assert!(engine.fading_groups().is_empty());
    assert_eq!(engine.active_groups().len(), 4);
    assert_eq!(backend.live_nodes(), 1 + nodes_for(Theme::Choice));

    // The reap owed by the earlier stop must leave the new graph alone.
    render(&backend, 1.0);
    engine.reap();
    assert!(engine.is_playing());
    assert_eq!(engine.active_groups().len(), 4);
    assert_eq!(backend.live_nodes(), 1 + nodes_for(Theme::Choice));

    render(&backend, 2.5);
    let level = engine.master_gain().unwrap_or_default();
    assert!((level - 0.4).abs() < 1e-4);
}

#[test]
fn stop_when_idle_is_a_no_op() {
    let (mut engine, backend) = make_engine();
    assert!(!engine.stop());
    engine.reap();
    assert_eq!(engine.state(), PlaybackState::Idle);
    // The backend is only acquired by `start`.
    assert!(engine.backend().is_none());
    assert_eq!(backend.live_nodes(), 0);
}

#[test]
fn failed_acquisition_disables_audio_for_good() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mut engine: SynthesisEngine<SoftBackend> = SynthesisEngine::new(
        move || {
            counter.set(counter.get() + 1);
            Err(AudioError::Unavailable("no audio device".into()))
        },
        0.4,
        1,
    );
    engine.start(Theme::Main);
    assert!(!engine.is_playing());
    assert!(engine.is_unavailable());
    engine.start(Theme::Main);
    assert!(!engine.stop());
    assert!(!engine.create_noise(0.1));
    assert!(!engine.play_transient(NOVA_THUMP));
    engine.collect_finished();
    engine.reap();
    assert_eq!(calls.get(), 1);
    assert!(engine.master_gain().is_none());
}

#[test]
fn suspended_backend_is_resumed_on_start() {
    let backend = SoftBackend::new_suspended(SR);
    let handle = backend.clone();
    assert_eq!(backend.state(), BackendState::Suspended);
    assert_eq!(render(&backend, 0.1), 0.0);
    assert_eq!(backend.current_time(), 0.0);

    let mut engine = SynthesisEngine::new(move || Ok(handle), 0.4, 3);
    engine.start(Theme::Main);
    assert_eq!(backend.state(), BackendState::Running);
    render(&backend, 0.1);
    assert!(backend.current_time() > 0.09);
}

#[test]
fn noise_layer_adds_one_group() {
    let (mut engine, backend) = make_engine();
    assert!(!engine.create_noise(0.05));
    engine.start(Theme::Choice);
    let before = backend.live_nodes();
    assert!(engine.create_noise(0.05));
    assert_eq!(engine.active_groups().len(), 5);
    assert_eq!(backend.live_nodes(), before + 3);

    engine.stop();
    engine.reap();
    assert_eq!(backend.live_nodes(), 1);
}

#[test]
fn noise_layer_alone_is_audible() {
    let backend = SoftBackend::new(SR);
    let handle = backend.clone();
    let mut engine = SynthesisEngine::new(move || Ok(handle), 1.0, 8);
    engine.start(Theme::Main);
    engine.create_noise(0.5);
    render(&backend, 3.0);
    assert!(render(&backend, 0.5) > 0.01);
}

#[test]
fn transients_play_only_while_playing_and_are_collected() {
    let (mut engine, backend) = make_engine();
    assert!(!engine.play_transient(GLITCH_BLIP));
    engine.start(Theme::Main);
    let base = backend.live_nodes();

    assert!(engine.play_transient(NOVA_THUMP));
    assert!(engine.play_transient(GLITCH_BLIP));
    assert_eq!(engine.transient_count(), 2);
    assert_eq!(backend.live_nodes(), base + 4);

    render(&backend, 0.2);
    engine.collect_finished();
    // The blip is done, the thump is still ringing.
    assert_eq!(engine.transient_count(), 1);

    render(&backend, 0.5);
    engine.collect_finished();
    assert_eq!(engine.transient_count(), 0);
    assert_eq!(backend.live_nodes(), base);
    assert_eq!(engine.active_groups().len(), 5);
}

#[test]
fn theme_names_parse() {
    assert_eq!("main".parse::<Theme>(), Ok(Theme::Main));
    assert_eq!("Choice".parse::<Theme>(), Ok(Theme::Choice));
    assert!("ambient".parse::<Theme>().is_err());
    assert_eq!(Theme::Main.other(), Theme::Choice);
    assert_eq!(Theme::Choice.to_string(), "choice");
}
