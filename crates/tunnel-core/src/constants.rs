// Shared simulation/audio tuning constants used by both web and native frontends.

// Camera
pub const MAX_DEPTH: f32 = 13_000.0; // upper clamp for the scroll target
pub const SCROLL_GAIN: f32 = 4.0; // raw wheel delta -> depth units
pub const DEPTH_SMOOTHING: f32 = 0.05; // fraction of the remaining distance covered per frame
pub const TRIGGER_DISTANCE: f32 = 1_000.0; // net travel between random event rolls

// Random event policy (cumulative thresholds on a uniform draw)
pub const GLITCH_THRESHOLD: f32 = 0.3;
pub const NOVA_THRESHOLD: f32 = 0.6;

// Invert band (exclusive on both ends)
pub const INVERT_MIN_DEPTH: f32 = 7_000.0;
pub const INVERT_MAX_DEPTH: f32 = 9_000.0;

// Section opacity bands in view space
pub const FADE_IN_START: f32 = -1_000.0;
pub const FULL_OPACITY_END: f32 = 500.0;
pub const FADE_OUT_END: f32 = 1_000.0;

// Section jitter
pub const JITTER_MIN_OPACITY: f32 = 0.1;
pub const JITTER_CHANCE: f32 = 0.1; // per section, per frame
pub const JITTER_DEEP_DEPTH: f32 = 8_000.0;
pub const JITTER_SHALLOW: f32 = 1.0; // px span of the offset window
pub const JITTER_DEEP: f32 = 5.0;

// Particle field
pub const DEFAULT_PARTICLE_COUNT: usize = 400;
pub const BURST_IMPULSE: f32 = 30.0;
pub const ATTRACTION: f32 = 0.2;
pub const SWIRL: f32 = 0.5; // perpendicular force
pub const VELOCITY_DAMPING: f32 = 0.96;
pub const ABSORB_RADIUS: f32 = 20.0;
pub const LIFE_MIN: f32 = 50.0;
pub const LIFE_SPAN: f32 = 100.0; // life drawn from [LIFE_MIN, LIFE_MIN + LIFE_SPAN)
pub const TRAIL_FADE_ALPHA: f32 = 0.1;

// Effect durations (milliseconds)
pub const BURST_MS: u64 = 800;
pub const GLITCH_MS: u64 = 500;
pub const REAP_DELAY_MS: u64 = 1_100; // fade-out ramp plus margin
pub const COLLAPSE_MS: u64 = 2_500;

// Audio envelopes (seconds)
pub const MASTER_LEVEL: f32 = 0.4;
pub const FADE_IN_SEC: f64 = 3.0;
pub const FADE_OUT_SEC: f64 = 1.0;
pub const TRANSIENT_ATTACK_SEC: f64 = 0.02;
pub const TRANSIENT_LEAD_SEC: f64 = 0.005; // scheduling headroom before a one-shot starts

// Ambient wind layer
pub const NOISE_BUFFER_SEC: f32 = 2.0;
pub const NOISE_CUTOFF_HZ: f32 = 400.0;
