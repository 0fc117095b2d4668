use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern};

use crate::state::theme::{Palette, Rgb};

const FONT: &str = "Calibri";

pub const TEMP_1DP: &str = "0.0\"\u{00B0}C\"";
pub const TEMP_2DP: &str = "0.00\"\u{00B0}C\"";
pub const DATETIME: &str = "yyyy-mm-dd hh:mm:ss";

fn color(c: Rgb) -> Color {
    Color::RGB(c.0)
}

/// Workbook formats derived from a [`Palette`].
pub struct Styles {
    palette: Palette,
    pub header: Format,
    pub title: Format,
    pub subtitle: Format,
    pub footer: Format,
    pub dark_fill: Format,
    pub section: Format,
}

impl Styles {
    pub fn new(palette: &Palette) -> Self {
        let p = palette;
        let base = |size: f64, fg: Rgb, bg: Rgb| {
            Format::new()
                .set_font_name(FONT)
                .set_font_size(size)
                .set_font_color(color(fg))
                .set_pattern(FormatPattern::Solid)
                .set_background_color(color(bg))
                .set_align(FormatAlign::VerticalCenter)
        };

        Self {
            palette: p.clone(),
            header: base(11.0, p.white, p.bg_header)
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_border_color(color(p.bg_header)),
            title: base(14.0, p.accent, p.bg_dark).set_bold().set_align(FormatAlign::Left),
            subtitle: base(10.0, p.dim, p.bg_dark),
            footer: base(9.0, p.dim, p.bg_dark),
            dark_fill: base(11.0, p.white, p.bg_dark),
            section: base(11.0, p.accent, p.bg_dark).set_bold(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn headline(&self) -> Format {
        self.title.clone().set_font_size(18.0)
    }

    /// Bordered data cell on `fill`.
    pub fn cell(&self, fg: Rgb, fill: Rgb, bold: bool, centered: bool) -> Format {
        let mut f = Format::new()
            .set_font_name(FONT)
            .set_font_size(11.0)
            .set_font_color(color(fg))
            .set_pattern(FormatPattern::Solid)
            .set_background_color(color(fill))
            .set_align(if centered { FormatAlign::Center } else { FormatAlign::Left })
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(color(self.palette.bg_header));
        if bold {
            f = f.set_bold();
        }
        f
    }

    /// Plain white data cell.
    pub fn data(&self, fill: Rgb, centered: bool) -> Format {
        self.cell(self.palette.white, fill, false, centered)
    }

    /// Fill for the `n`-th body row: card and dark alternate.
    pub fn stripe(&self, n: usize) -> Rgb {
        if n % 2 == 0 {
            self.palette.bg_card
        } else {
            self.palette.bg_dark
        }
    }
}
