use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPreset {
    pub label: &'static str,
    pub value: &'static str,
    pub text_color: &'static str,
    pub background_color: &'static str,
}

impl ColorPreset {
    pub fn text_rgb(&self) -> Rgb {
        Rgb::from_hex(self.text_color).unwrap_or(Rgb::BLACK)
    }

    pub fn background_rgb(&self) -> Rgb {
        Rgb::from_hex(self.background_color).unwrap_or(Rgb::BLACK)
    }
}

const fn preset(
    label: &'static str,
    value: &'static str,
    text_color: &'static str,
    background_color: &'static str,
) -> ColorPreset {
    ColorPreset {
        label,
        value,
        text_color,
        background_color,
    }
}

pub static COLOR_PRESETS: [ColorPreset; 11] = [
    preset("brat deluxe", "bratdeluxe", "#000000", "#ffffff"),
    preset("brat", "brat", "#000000", "#8ace00"),
    preset("crash", "crash", "#f70000", "#019bd9"),
    preset("how i'm feeling now", "howimfeelingnow", "#c1c1c1", "#ffffff"),
    preset("charli", "charli", "#000000", "#918a84"),
    preset("pop 2", "pop2", "#000000", "#c9a1dd"),
    preset("vroom vroom", "vroomvroom", "#404040", "#000000"),
    preset("number 1 angel", "number1angel", "#ff1000", "#d20001"),
    preset("sucker", "sucker", "#ffffff", "#f5abcc"),
    preset("true romance", "trueromance", "#ffffff", "#700150"),
    preset("custom color", "custom", "#8ace00", "#000000"),
];

pub fn find_preset(value: &str) -> Option<&'static ColorPreset> {
    COLOR_PRESETS.iter().find(|p| p.value == value)
}

/// Looks a preset up by identifier, falling back to "brat" (the second entry).
pub fn preset_or_default(value: Option<&str>) -> &'static ColorPreset {
    value
        .and_then(find_preset)
        .unwrap_or(&COLOR_PRESETS[1])
}
