use glam::Vec3;

/// A value a timeline can interpolate.
pub trait Lerp: Copy + PartialEq + std::fmt::Debug + 'static {
    fn lerp(a: Self, b: Self, alpha: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(a: Self, b: Self, alpha: f32) -> Self {
        a + (b - a) * alpha
    }
}

impl Lerp for Vec3 {
    fn lerp(a: Self, b: Self, alpha: f32) -> Self {
        a.lerp(b, alpha)
    }
}

/// Linear-space RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearColor {
    pub const BLACK: LinearColor = LinearColor::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: LinearColor = LinearColor::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: LinearColor = LinearColor::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Lerp for LinearColor {
    fn lerp(a: Self, b: Self, alpha: f32) -> Self {
        LinearColor {
            r: <f32 as Lerp>::lerp(a.r, b.r, alpha),
            g: <f32 as Lerp>::lerp(a.g, b.g, alpha),
            b: <f32 as Lerp>::lerp(a.b, b.b, alpha),
            a: <f32 as Lerp>::lerp(a.a, b.a, alpha),
        }
    }
}
