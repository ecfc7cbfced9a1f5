/// A block of 2D text drawn over the scene (help panel, user dialog).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnScreenText {
    text: String,
    visible: bool,
}

impl OnScreenText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Returns the new visibility.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}
