//! HUD text
//!
//! The display capability: game logic pushes strings, the renderer draws
//! whatever was pushed last.

/// Something that shows a line of text
pub trait TextDisplay {
    fn set_text(&mut self, value: String);
}

/// Right-aligned label in the top corner of each eye's viewport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudLabel {
    text: String,
}

impl HudLabel {
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TextDisplay for HudLabel {
    fn set_text(&mut self, value: String) {
        self.text = value;
    }
}
