// Pure CSS string builders; kept free of web-sys so host tests can include them.

/// Centering prefix shared by the container and every section.
const CENTER: &str = "translate(-50%, -50%)";

pub fn container_transform(depth: f32) -> String {
    format!("{CENTER} translate3d(0, 0, {depth}px)")
}

pub fn section_transform(dx: f32, dy: f32, sec_z: f32) -> String {
    format!("{CENTER} translate3d({dx}px, {dy}px, {sec_z}px)")
}

/// Parse a section's `--z` value (`"-2000"`, `" -2000px "`); unset means 0.
pub fn parse_depth(raw: &str) -> Option<f32> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    s.strip_suffix("px").unwrap_or(s).trim().parse::<f32>().ok().filter(|v| v.is_finite())
}
