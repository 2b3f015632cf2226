// DOM anchors and CSS values the web front-end reads and writes.

// Element ids / selectors
pub const TUNNEL_CONTAINER_ID: &str = "tunnel-container";
pub const SECTION_SELECTOR: &str = ".tunnel-section";
pub const DEPTH_READOUT_ID: &str = "z-val";
pub const VORTEX_CANVAS_ID: &str = "vortex-canvas";
pub const COLLAPSE_BUTTON_ID: &str = "collapseBtn";

// Section depth custom property (px, negative = further away)
pub const SECTION_DEPTH_VAR: &str = "--z";

// data-target on the collapse control overrides the navigation target
pub const COLLAPSE_TARGET_KEY: &str = "target";

// Body classes
pub const INVERT_CLASS: &str = "invert-mode";
pub const SHAKE_CLASS: &str = "shake-mode";

// Glitch flash
pub const GLITCH_FILTER: &str = "hue-rotate(90deg) contrast(200%)";

// Collapse transition
pub const COLLAPSE_ORIGIN: &str = "center center";
pub const COLLAPSE_TRANSFORM: &str = "scale(0) rotate(720deg)";
pub const COLLAPSE_FILTER: &str = "invert(1) contrast(500%)";
pub const COLLAPSE_TRANSITION: &str = "all 2.5s cubic-bezier(0.8, 0, 0.2, 1)";

// Window events that count as the audio-unlocking gesture
pub const GESTURE_EVENTS: [&str; 2] = ["click", "wheel"];
