use nu_ansi_term::{Color, Style};

use crate::Category;

/// Catppuccin Mocha accents, one per instruction category.
pub struct Palette;

impl Palette {
    const TEXT: Color = Color::Rgb(205, 214, 244);
    const SURFACE2: Color = Color::Rgb(108, 112, 134);
    const RED: Color = Color::Rgb(243, 139, 168);
    const GREEN: Color = Color::Rgb(166, 227, 161);
    const YELLOW: Color = Color::Rgb(249, 226, 175);
    const MAUVE: Color = Color::Rgb(203, 166, 247);
    const SKY: Color = Color::Rgb(137, 220, 235);

    /// Style for a byte of the given category; `None` is a byte the engine
    /// would reject.
    pub fn style(category: Option<Category>) -> Style {
        match category {
            Some(Category::Operator) => Style::new().fg(Self::GREEN).bold(),
            Some(Category::Mover) => Style::new().fg(Self::SKY).bold(),
            Some(Category::Looper) => Style::new().fg(Self::MAUVE).bold(),
            Some(Category::Retriever) => Style::new().fg(Self::YELLOW).bold(),
            Some(Category::Ignore) => Style::new().fg(Self::TEXT),
            None => Style::new().fg(Self::SURFACE2).italic(),
        }
    }

    /// Style for error headers in the REPL.
    pub fn error() -> Style {
        Style::new().fg(Self::RED).bold()
    }
}
