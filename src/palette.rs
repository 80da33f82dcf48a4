// src/palette.rs
use crate::analysis::normalize_hex;

/// Swatches offered by the colour picker, light to dark per hue family.
pub const PALETTE: &[&str] = &[
    "#FFFFFF", "#F5F5F5", "#EEEEEE", "#E0E0E0", "#BDBDBD", "#B6B6B6", "#9E9E9E", "#757575",
    "#616161", "#424242", "#212121", "#FFCDD2", "#F8BBD0", "#E1BEE7", "#D1C4E9", "#C5CAE9", "#BBDEFB",
    "#B3E5FC", "#B2EBF2", "#B2DFDB", "#C8E6C9", "#DCEDC8", "#F0F4C3", "#FFF9C4", "#FFECB3",
    "#FFE0B2", "#FFCCBC", "#D7CCC8", "#CFD8DC", "#B0BEC5", "#EF9A9A", "#F48FB1", "#CE93D8",
    "#B39DDB", "#9FA8DA", "#90CAF9", "#81D4FA", "#80DEEA", "#80CBC4", "#A5D6A7", "#C5E1A5",
    "#E6EE9C", "#FFF59D", "#FFE082", "#FFCC80", "#FFAB91", "#BCAAA4", "#90A4AE", "#E57373",
    "#F06292", "#BA68C8", "#9575CD", "#7986CB", "#64B5F6", "#4FC3F7", "#4DD0E1", "#4DB6AC",
    "#81C784", "#AED581", "#DCE775", "#FFF176", "#FFD54F", "#FFB74D", "#FF8A65", "#A1887F",
    "#78909C", "#EF5350", "#EC407A", "#AB47BC", "#7E57C2", "#5C6BC0", "#42A5F5", "#29B6F6",
    "#26C6DA", "#26A69A", "#66BB6A", "#9CCC65", "#D4E157", "#FFEE58", "#FFCA28", "#FFA726",
    "#FF7043", "#8D6E63", "#607D8B", "#F44336", "#E91E63", "#9C27B0", "#673AB7", "#3F51B5",
    "#2196F3", "#03A9F4", "#00BCD4", "#009688", "#4CAF50", "#8BC34A", "#CDDC39", "#FFEB3B",
    "#FFC107", "#FF9800", "#FF5722", "#795548", "#455A64", "#D32F2F", "#C2185B", "#7B1FA2",
    "#512DA8", "#303F9F", "#1976D2", "#0288D1", "#0097A7", "#00796B", "#388E3C", "#689F38",
    "#AFB42B", "#FBC02D", "#FFA000", "#F57C00", "#E64A19", "#5D4037", "#37474F", "#B71C1C",
    "#880E4F", "#4A148C", "#311B92", "#1A237E", "#0D47A1", "#01579B", "#006064", "#004D40",
    "#1B5E20", "#33691E", "#827717", "#F57F17", "#FF6F00", "#E65100", "#BF360C", "#3E2723",
    "#263238",
];

/// Returns the palette entry for `hex`, if the picker offers it.
pub fn choose(hex: &str) -> Option<&'static str> {
    let wanted = normalize_hex(hex)?;
    PALETTE.iter().copied().find(|entry| *entry == wanted)
}

/// Closest swatch to an arbitrary colour, by squared RGB distance.
pub fn nearest(hex: &str) -> Option<&'static str> {
    let target = to_rgb(hex)?;
    PALETTE
        .iter()
        .copied()
        .filter_map(|entry| to_rgb(entry).map(|rgb| (entry, distance(rgb, target))))
        .min_by_key(|(_, d)| *d)
        .map(|(entry, _)| entry)
}

fn to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let normalized = normalize_hex(hex)?;
    let digits = &normalized[1..];
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2) as u32;
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}
