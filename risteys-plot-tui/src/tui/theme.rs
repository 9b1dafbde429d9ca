use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight: Color,
    pub axis: Color,
    pub suppressed: Color,
    pub hover: Color,
    pub guide: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            axis: Color::Gray,
            suppressed: Color::DarkGray,
            hover: Color::LightYellow,
            guide: Color::DarkGray,
            error: Color::Red,
            warning: Color::LightYellow,
            success: Color::LightGreen,
        }
    }
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            highlight: Color::Blue,
            axis: Color::DarkGray,
            suppressed: Color::Gray,
            hover: Color::Magenta,
            guide: Color::Gray,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
        }
    }
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(216, 222, 233),
            highlight: Color::Rgb(136, 192, 208),
            axis: Color::Rgb(129, 161, 193),
            suppressed: Color::Rgb(76, 86, 106),
            hover: Color::Rgb(235, 203, 139),
            guide: Color::Rgb(76, 86, 106),
            error: Color::Rgb(191, 97, 106),
            warning: Color::Rgb(235, 203, 139),
            success: Color::Rgb(163, 190, 140),
        }
    }
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "nord" => Self::nord(),
            _ => Self::dark(),
        }
    }

    /// Plot colours arrive as `#rrggbb` (or `#rgb`); anything else falls back to `fg`.
    pub fn plot_color(&self, hex: Option<&str>) -> Color {
        hex.and_then(parse_hex).unwrap_or(self.fg)
    }
}

pub fn parse_hex(s: &str) -> Option<Color> {
    let h = s.strip_prefix('#')?;
    let expanded: String = match h.len() {
        3 => h.chars().flat_map(|c| [c, c]).collect(),
        6 => h.to_string(),
        _ => return None,
    };
    let v = u32::from_str_radix(&expanded, 16).ok()?;
    Some(Color::Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
}

#[cfg(test)]
mod tests_theme {
    use super::*;

    #[test]
    fn hex_colours() {
        assert_eq!(parse_hex("#22292F"), Some(Color::Rgb(0x22, 0x29, 0x2f)));
        assert_eq!(parse_hex("#eee"), Some(Color::Rgb(0xee, 0xee, 0xee)));
        assert_eq!(parse_hex("steelblue"), None);
        assert_eq!(Theme::dark().plot_color(Some("nope")), Color::White);
    }
}
