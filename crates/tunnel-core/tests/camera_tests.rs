// Host-side tests for the depth camera.

use rand::prelude::*;
use tunnel_core::camera::*;
use tunnel_core::constants::*;
use tunnel_core::effects::EffectEvent;

fn make_camera() -> ScrollCamera {
    ScrollCamera::new(MAX_DEPTH, SCROLL_GAIN, 42)
}

#[test]
fn scroll_target_clamps_at_max_depth() {
    let mut cam = make_camera();
    for _ in 0..200 {
        cam.apply_scroll(100.0); // 20000 raw units in total
    }
    assert_eq!(cam.state().target_z, 13_000.0);

    let mut events = Vec::new();
    for _ in 0..2_000 {
        cam.step(&mut events);
        assert!(cam.depth() <= 13_000.0);
    }
    assert!((cam.depth() - 13_000.0).abs() < 1.0);
}

#[test]
fn scroll_target_clamps_at_zero() {
    let mut cam = make_camera();
    cam.apply_scroll(50.0);
    cam.apply_scroll(-10_000.0);
    assert_eq!(cam.state().target_z, 0.0);
}

#[test]
fn scroll_applies_gain_without_smoothing() {
    let mut cam = make_camera();
    cam.apply_scroll(25.0);
    assert_eq!(cam.state().target_z, 100.0);
    assert_eq!(cam.depth(), 0.0);
}

#[test]
fn non_finite_scroll_is_ignored() {
    let mut cam = make_camera();
    cam.apply_scroll(10.0);
    cam.apply_scroll(f32::NAN);
    cam.apply_scroll(f32::INFINITY);
    assert_eq!(cam.state().target_z, 40.0);
}

#[test]
fn smoothing_closes_gap_without_overshoot() {
    let mut cam = make_camera();
    cam.apply_scroll(1_250.0); // target 5000
    let target = cam.state().target_z;
    let mut events = Vec::new();
    let mut gap = (target - cam.depth()).abs();
    for _ in 0..150 {
        cam.step(&mut events);
        let next = (target - cam.depth()).abs();
        assert!(next < gap, "gap did not shrink: {next} >= {gap}");
        assert!(cam.depth() <= target);
        gap = next;
    }
}

#[test]
fn smooth_toward_moves_five_percent() {
    assert!((smooth_toward(0.0, 1000.0) - 50.0).abs() < 1e-4);
    assert!((smooth_toward(1000.0, 0.0) - 950.0).abs() < 1e-4);
}

#[test]
fn invert_band_is_exclusive() {
    assert!(!is_invert_depth(7_000.0));
    assert!(is_invert_depth(7_000.5));
    assert!(is_invert_depth(8_000.0));
    assert!(is_invert_depth(8_999.5));
    assert!(!is_invert_depth(9_000.0));
    assert!(!is_invert_depth(0.0));
    assert!(!is_invert_depth(13_000.0));
}

#[test]
fn opacity_matches_band_table() {
    let cases = [
        (-1_500.0, 0.0),
        (-1_000.0, 0.0),
        (-500.0, 0.5),
        (0.0, 1.0),
        (250.0, 1.0),
        (750.0, 0.5),
        (1_000.0, 0.0),
        (1_500.0, 0.0),
    ];
    for (view_z, expected) in cases {
        let o = opacity_for_view_z(view_z);
        assert!((o - expected).abs() < 1e-5, "opacity({view_z}) = {o}, expected {expected}");
    }
}

#[test]
fn roll_thresholds() {
    assert_eq!(roll_effect(0.0), Some(EffectEvent::Glitch));
    assert_eq!(roll_effect(0.299), Some(EffectEvent::Glitch));
    assert_eq!(roll_effect(0.3), Some(EffectEvent::Nova));
    assert_eq!(roll_effect(0.599), Some(EffectEvent::Nova));
    assert_eq!(roll_effect(0.6), None);
    assert_eq!(roll_effect(0.999), None);
}

#[test]
fn dispatch_rates_are_roughly_30_30_40() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 20_000;
    let (mut glitch, mut nova, mut none) = (0, 0, 0);
    for _ in 0..n {
        match roll_effect(rng.gen()) {
            Some(EffectEvent::Glitch) => glitch += 1,
            Some(EffectEvent::Nova) => nova += 1,
            None => none += 1,
        }
    }
    let rate = |c: i32| c as f32 / n as f32;
    assert!((rate(glitch) - 0.3).abs() < 0.02, "glitch rate {}", rate(glitch));
    assert!((rate(nova) - 0.3).abs() < 0.02, "nova rate {}", rate(nova));
    assert!((rate(none) - 0.4).abs() < 0.02, "none rate {}", rate(none));
}

#[test]
fn trigger_distance_is_rearmed_after_each_roll() {
    let mut cam = make_camera();
    cam.apply_scroll(4_000.0);
    let mut events = Vec::new();
    let mut rearms = 0;
    let mut last = cam.state().last_trigger_z;
    for _ in 0..600 {
        cam.step(&mut events);
        let s = cam.state();
        assert!((s.z_pos - s.last_trigger_z).abs() <= TRIGGER_DISTANCE);
        if s.last_trigger_z != last {
            rearms += 1;
            last = s.last_trigger_z;
        }
    }
    // 13000 units of travel; overshoot past each threshold can cost a roll.
    assert!((10..=12).contains(&rearms), "rearmed {rearms} times");
    assert!(events.len() <= rearms);
}

#[test]
fn reversing_direction_also_triggers() {
    let mut cam = make_camera();
    cam.apply_scroll(1_000.0); // target 4000
    let mut events = Vec::new();
    for _ in 0..400 {
        cam.step(&mut events);
    }
    let before = cam.state().last_trigger_z;
    cam.apply_scroll(-1_000.0); // back to 0
    for _ in 0..400 {
        cam.step(&mut events);
    }
    assert!(cam.state().last_trigger_z < before);
}

#[test]
fn faint_sections_never_jitter_and_offsets_stay_in_window() {
    let mut cam = make_camera();
    let sections: Vec<Section> = (0..12).map(|i| Section { depth: -(i as f32) * 1_000.0 }).collect();
    let mut visuals = Vec::new();
    let mut jittered = 0;
    for _ in 0..500 {
        cam.render_sections(&sections, &mut visuals);
        assert_eq!(visuals.len(), sections.len());
        for v in &visuals {
            if v.opacity <= JITTER_MIN_OPACITY {
                assert_eq!(v.offset, glam::Vec2::ZERO);
            }
            assert!(v.offset.x.abs() <= 0.5 && v.offset.y.abs() <= 0.5);
            if v.offset != glam::Vec2::ZERO {
                jittered += 1;
            }
        }
    }
    // Only the section at depth 0 is visible; about 10% of 500 frames.
    assert!((20..=90).contains(&jittered), "jittered {jittered} times");
}

#[test]
fn deep_jitter_window_widens() {
    let mut cam = make_camera();
    cam.apply_scroll(10_000.0);
    let mut events = Vec::new();
    while cam.depth() <= JITTER_DEEP_DEPTH + 10.0 {
        cam.step(&mut events);
    }
    assert_eq!(cam.jitter_span(), JITTER_DEEP);

    let z = cam.depth();
    let sections = [Section { depth: -z }];
    let mut visuals = Vec::new();
    let mut widest = 0.0f32;
    for _ in 0..2_000 {
        cam.render_sections(&sections, &mut visuals);
        let o = visuals[0].offset;
        assert!(o.x.abs() <= 2.5 && o.y.abs() <= 2.5);
        widest = widest.max(o.x.abs()).max(o.y.abs());
    }
    assert!(widest > 0.5, "deep jitter never exceeded the shallow window");
}

#[test]
fn depth_readout_is_zero_padded() {
    assert_eq!(depth_readout(0.0), "00000");
    assert_eq!(depth_readout(42.4), "00042");
    assert_eq!(depth_readout(42.5), "00043");
    assert_eq!(depth_readout(12_999.6), "13000");
}
