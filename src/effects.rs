use crate::error::{AzError, Result};

/// Fire-and-forget side effects triggered from the dashboard.
pub trait Effects {
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;
    fn open_in_browser(&mut self, url: &str) -> Result<()>;
}

/// System clipboard and default browser.
#[derive(Default)]
pub struct SystemEffects {
    // Kept alive so X11/Wayland selections survive after the copy returns.
    clipboard: Option<arboard::Clipboard>,
}

impl Effects for SystemEffects {
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        let mut clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().map_err(|e| AzError::Clipboard(e.to_string()))?,
        };
        let result = clipboard
            .set_text(text.to_string())
            .map_err(|e| AzError::Clipboard(e.to_string()));
        self.clipboard = Some(clipboard);
        result
    }

    fn open_in_browser(&mut self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| AzError::Browser(e.to_string()))
    }
}
