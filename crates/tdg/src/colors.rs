//! Trello label palette.
//!
//! Cards carry palette names (`green`, `sky`, ...); the diagram needs fill
//! colors. Names outside the palette, and colorless labels, render purple.

/// Palette name and hex fill, in Trello's picker order.
pub const PALETTE: &[(&str, &str)] = &[
    ("green", "#61bd4f"),
    ("yellow", "#f2d600"),
    ("orange", "#ff9f1a"),
    ("red", "#eb5a46"),
    ("purple", "#c377e0"),
    ("blue", "#0079bf"),
    ("sky", "#00c2e0"),
    ("lime", "#51e898"),
    ("pink", "#ff78cb"),
    ("black", "#355263"),
];

const FALLBACK: &str = "#c377e0";

/// Hex fill for a palette name.
pub fn label_hex(name: Option<&str>) -> &'static str {
    name.and_then(|name| {
        PALETTE
            .iter()
            .find(|(palette_name, _)| *palette_name == name)
            .map(|(_, hex)| *hex)
    })
    .unwrap_or(FALLBACK)
}
