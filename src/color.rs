/// An RGBA color with channels between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1., 1., 1., 1.);
    pub const BLACK: Color = Color::rgba(0., 0., 0., 1.);
    pub const TRANSPARENT: Color = Color::rgba(0., 0., 0., 0.);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color::rgba(r, g, b, 1.)
    }

    /// Returns the same color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Color {
        Color { a, ..self }
    }
}
