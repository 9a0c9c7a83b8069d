//! CPU-side model of the plane material's uniforms, plus a reference of the
//! fragment blend used to pin down the wipe contract in tests.

use tracing::warn;

/// Smallest wipe edge width accepted; a zero-width edge would make the
/// smoothstep degenerate.
pub const MIN_EDGE_SOFTNESS: f32 = 0.001;

/// Upper end of the strength slider; material strength never leaves `[0, MAX_STRENGTH]`.
pub const MAX_STRENGTH: f32 = 2.0;

/// One of the two loaded color textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Primary,
    Secondary,
}

/// Which physical texture currently sits in the "from" slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveIndex {
    #[default]
    One,
    Two,
}

impl ActiveIndex {
    pub fn flipped(self) -> Self {
        match self {
            ActiveIndex::One => ActiveIndex::Two,
            ActiveIndex::Two => ActiveIndex::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            ActiveIndex::One => 1,
            ActiveIndex::Two => 2,
        }
    }

    /// `(from, to)` texture slots for this index.
    pub fn slots(self) -> (TextureSlot, TextureSlot) {
        match self {
            ActiveIndex::One => (TextureSlot::Primary, TextureSlot::Secondary),
            ActiveIndex::Two => (TextureSlot::Secondary, TextureSlot::Primary),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub color: [f32; 3],
    pub strength: f32,
    pub edge_softness: f32,
    pub edge_glow: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: [0.0, 0x88 as f32 / 255.0, 1.0],
            strength: 0.05,
            edge_softness: 0.1,
            edge_glow: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialUniforms {
    color: [f32; 3],
    from: TextureSlot,
    to: TextureSlot,
    transition: f32,
    time: f32,
    strength: f32,
    edge_softness: f32,
    edge_glow: f32,
}

impl MaterialUniforms {
    pub fn new(params: MaterialParams) -> Self {
        let (from, to) = ActiveIndex::One.slots();
        let mut uniforms = Self {
            color: params.color,
            from,
            to,
            transition: 0.0,
            time: 0.0,
            strength: 0.0,
            edge_softness: params.edge_softness.max(MIN_EDGE_SOFTNESS),
            edge_glow: params.edge_glow.max(0.0),
        };
        uniforms.set_strength(params.strength);
        uniforms
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn from_slot(&self) -> TextureSlot {
        self.from
    }

    pub fn to_slot(&self) -> TextureSlot {
        self.to
    }

    pub fn assign_slots(&mut self, active: ActiveIndex) {
        let (from, to) = active.slots();
        self.from = from;
        self.to = to;
    }

    pub fn transition(&self) -> f32 {
        self.transition
    }

    /// Clamps into `[0, 1]`; NaN is ignored.
    pub fn set_transition(&mut self, value: f32) {
        if value.is_nan() {
            warn!("ignoring NaN transition value");
            return;
        }
        self.transition = value.clamp(0.0, 1.0);
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance_time(&mut self, step: f32) {
        self.time += step;
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Clamps into `[0, MAX_STRENGTH]`. Returns false and keeps the previous
    /// value when `value` is not finite.
    pub fn set_strength(&mut self, value: f32) -> bool {
        if !value.is_finite() {
            warn!(value, "ignoring non-finite strength");
            return false;
        }
        let clamped = value.clamp(0.0, MAX_STRENGTH);
        if clamped != value {
            warn!(value, clamped, "strength outside the slider range; clamping");
        }
        self.strength = clamped;
        true
    }

    pub fn edge_softness(&self) -> f32 {
        self.edge_softness
    }

    pub fn edge_glow(&self) -> f32 {
        self.edge_glow
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Share of the "to" texture at a pixel whose mask reads `mask`.
///
/// The wipe front sweeps from dark mask values to bright ones; the endpoints
/// are pinned so `transition` 0 and 1 select one texture exactly.
pub fn wipe_factor(mask: f32, transition: f32, softness: f32) -> f32 {
    if transition <= 0.0 {
        return 0.0;
    }
    if transition >= 1.0 {
        return 1.0;
    }
    let softness = softness.max(MIN_EDGE_SOFTNESS);
    let threshold = mask.clamp(0.0, 1.0);
    let progress = transition * (1.0 + softness);
    smoothstep(threshold, threshold + softness, progress)
}

/// Glow weight on the wipe front, zero on either side of it.
pub fn edge_band(factor: f32) -> f32 {
    4.0 * factor * (1.0 - factor)
}

/// Mirrors the fragment shader's blend (without the optional glow).
pub fn blend_texel(
    from: [f32; 4],
    to: [f32; 4],
    mask: f32,
    transition: f32,
    softness: f32,
) -> [f32; 4] {
    let factor = wipe_factor(mask, transition, softness);
    std::array::from_fn(|channel| from[channel] * (1.0 - factor) + to[channel] * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FROM: [f32; 4] = [0.9, 0.3, 0.1, 1.0];
    const TO: [f32; 4] = [0.05, 0.6, 0.85, 0.75];

    #[test]
    fn transition_zero_outputs_from_exactly() {
        for mask in [0.0, 0.25, 0.5, 1.0] {
            for softness in [MIN_EDGE_SOFTNESS, 0.1, 0.7] {
                assert_eq!(blend_texel(FROM, TO, mask, 0.0, softness), FROM);
            }
        }
    }

    #[test]
    fn transition_one_outputs_to_exactly() {
        for mask in [0.0, 0.25, 0.5, 1.0] {
            for softness in [MIN_EDGE_SOFTNESS, 0.1, 0.7] {
                assert_eq!(blend_texel(FROM, TO, mask, 1.0, softness), TO);
            }
        }
    }

    #[test]
    fn blend_moves_monotonically_toward_to() {
        for mask in [0.0, 0.3, 0.6, 1.0] {
            let mut last = 0.0;
            for step in 0..=200 {
                let factor = wipe_factor(mask, step as f32 / 200.0, 0.1);
                assert!(factor >= last, "mask {mask} regressed at step {step}");
                last = factor;
            }
        }
    }

    #[test]
    fn darker_mask_pixels_switch_first() {
        let dark = wipe_factor(0.1, 0.4, 0.1);
        let bright = wipe_factor(0.9, 0.4, 0.1);
        assert!(dark > bright);
        assert_eq!(bright, 0.0);
    }

    #[test]
    fn edge_band_vanishes_at_the_ends() {
        assert_eq!(edge_band(0.0), 0.0);
        assert_eq!(edge_band(1.0), 0.0);
        assert!((edge_band(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn strength_rejects_non_finite_values() {
        let mut material = MaterialUniforms::new(MaterialParams::default());
        assert!(!material.set_strength(f32::INFINITY));
        assert!(!material.set_strength(f32::NAN));
        assert_eq!(material.strength(), 0.05);
        assert!(material.set_strength(1.5));
        assert_eq!(material.strength(), 1.5);
    }

    #[test]
    fn strength_stays_inside_the_slider_range() {
        let material = MaterialUniforms::new(MaterialParams {
            strength: 5.0,
            ..MaterialParams::default()
        });
        assert_eq!(material.strength(), MAX_STRENGTH);

        let mut material = MaterialUniforms::new(MaterialParams::default());
        assert!(material.set_strength(-1.0));
        assert_eq!(material.strength(), 0.0);
    }

    #[test]
    fn transition_is_clamped_into_unit_range() {
        let mut material = MaterialUniforms::new(MaterialParams::default());
        material.set_transition(1.7);
        assert_eq!(material.transition(), 1.0);
        material.set_transition(-0.2);
        assert_eq!(material.transition(), 0.0);
        material.set_transition(f32::NAN);
        assert_eq!(material.transition(), 0.0);
    }

    #[test]
    fn active_index_maps_to_slots() {
        assert_eq!(
            ActiveIndex::One.slots(),
            (TextureSlot::Primary, TextureSlot::Secondary)
        );
        assert_eq!(
            ActiveIndex::Two.slots(),
            (TextureSlot::Secondary, TextureSlot::Primary)
        );
        assert_eq!(ActiveIndex::One.flipped(), ActiveIndex::Two);
        assert_eq!(ActiveIndex::Two.flipped().number(), 1);
    }
}
