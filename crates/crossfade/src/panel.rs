use crate::material::MAX_STRENGTH;

/// Bounded numeric control.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    label: &'static str,
    min: f32,
    max: f32,
    step: f32,
    value: f32,
}

impl Slider {
    pub fn new(label: &'static str, min: f32, max: f32, step: f32, value: f32) -> Self {
        let mut slider = Self {
            label,
            min,
            max,
            step: step.abs().max(f32::EPSILON),
            value: min,
        };
        slider.mirror(value);
        slider
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Moves by whole steps, snapping onto the step grid, and returns the new
    /// value.
    pub fn nudge(&mut self, steps: i32) -> f32 {
        let raw = self.value + steps as f32 * self.step;
        let snapped = (raw / self.step).round() * self.step;
        self.value = snapped.clamp(self.min, self.max);
        self.value
    }

    /// Reflects an externally driven value without snapping.
    pub fn mirror(&mut self, value: f32) {
        if value.is_finite() {
            self.value = value.clamp(self.min, self.max);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkbox {
    label: &'static str,
    checked: bool,
}

impl Checkbox {
    pub fn new(label: &'static str, checked: bool) -> Self {
        Self { label, checked }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn toggle(&mut self) -> bool {
        self.checked = !self.checked;
        self.checked
    }

    pub fn mirror(&mut self, checked: bool) {
        self.checked = checked;
    }
}

/// Raw interactions with the panel, typically from key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelInput {
    Start,
    Stop,
    ToggleAutoAnimate,
    NudgeTransition(i32),
    NudgeStrength(i32),
}

/// What the panel asks the scene to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelCommand {
    SetTransition(f32),
    SetStrength(f32),
    AutoAnimate(bool),
    Start,
    Stop,
}

/// Transition and strength sliders plus the auto-animate checkbox.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPanel {
    transition: Slider,
    strength: Slider,
    auto_animate: Checkbox,
}

impl ParameterPanel {
    pub const STEP: f32 = 0.01;

    pub fn new(transition: f32, strength: f32, auto_animate: bool) -> Self {
        Self {
            transition: Slider::new("transition", 0.0, 1.0, Self::STEP, transition),
            strength: Slider::new("strength", 0.0, MAX_STRENGTH, Self::STEP, strength),
            auto_animate: Checkbox::new("auto animate", auto_animate),
        }
    }

    pub fn transition(&self) -> &Slider {
        &self.transition
    }

    pub fn strength(&self) -> &Slider {
        &self.strength
    }

    pub fn auto_animate(&self) -> &Checkbox {
        &self.auto_animate
    }

    pub fn handle(&mut self, input: PanelInput) -> PanelCommand {
        match input {
            PanelInput::Start => PanelCommand::Start,
            PanelInput::Stop => PanelCommand::Stop,
            PanelInput::ToggleAutoAnimate => {
                PanelCommand::AutoAnimate(self.auto_animate.toggle())
            }
            PanelInput::NudgeTransition(steps) => {
                PanelCommand::SetTransition(self.transition.nudge(steps))
            }
            PanelInput::NudgeStrength(steps) => {
                PanelCommand::SetStrength(self.strength.nudge(steps))
            }
        }
    }

    /// Pulls live slider values back into the controls after a frame.
    ///
    /// The checkbox is left alone: stopping a cycling fade pauses it without
    /// unticking auto-animate.
    pub fn sync(&mut self, transition: f32, strength: f32) {
        self.transition.mirror(transition);
        self.strength.mirror(strength);
    }

    /// Records an auto-animate change that did not come from `handle`.
    pub fn set_auto_animate(&mut self, checked: bool) {
        self.auto_animate.mirror(checked);
    }

    pub fn readout(&self) -> String {
        format!(
            "{} {:.2} | {} {:.2} | {} {}",
            self.transition.label(),
            self.transition.value(),
            self.strength.label(),
            self.strength.value(),
            self.auto_animate.label(),
            if self.auto_animate.checked() { "on" } else { "off" },
        )
    }
}
