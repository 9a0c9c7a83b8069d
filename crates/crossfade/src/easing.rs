/// Easing curves available to tweens.
///
/// `CubicInOut` matches the crossfade's slow-in/slow-out shape and `QuadOut`
/// the pointer follow, which decelerates into its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    Smoothstep,
    QuadInOut,
    #[default]
    CubicInOut,
    QuadOut,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => clamped,
            Easing::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            Easing::QuadInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
            Easing::CubicInOut => {
                if clamped < 0.5 {
                    4.0 * clamped * clamped * clamped
                } else {
                    let inv = -2.0 * clamped + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Easing::QuadOut => {
                let inv = 1.0 - clamped;
                1.0 - inv * inv
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Smoothstep => "smoothstep",
            Easing::QuadInOut => "quad-in-out",
            Easing::CubicInOut => "cubic-in-out",
            Easing::QuadOut => "quad-out",
        }
    }
}
