use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Single-line text input used by the base-name and add-files popups.
#[derive(Default, Clone)]
pub(crate) struct TextForm {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TextForm {
    /// Seed the form with an existing value, e.g. the current base name.
    pub(crate) fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    /// Append a character, ignoring control characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        self.error = None;
        true
    }

    /// Append pasted text; newlines become spaces so the field stays one line.
    pub(crate) fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' || ch == '\r' {
                self.value.push(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Render `label: value`, with a dim placeholder while empty.
    pub(crate) fn build_line(&self, label: &str, placeholder: &str) -> Line<'static> {
        let value_span = if self.value.is_empty() {
            Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.value.clone(), Style::default().fg(Color::Yellow))
        };
        Line::from(vec![Span::raw(format!("{label}: ")), value_span])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_characters_are_ignored() {
        let mut form = TextForm::default();
        assert!(form.push_char('V'));
        assert!(!form.push_char('\u{7}'));
        assert_eq!(form.value, "V");
    }

    #[test]
    fn typing_clears_error_and_backspace_pops() {
        let mut form = TextForm::with_value("Vi");
        form.error = Some("bad".into());
        form.push_char('c');
        assert!(form.error.is_none());
        form.backspace();
        assert_eq!(form.value, "Vi");
        assert_eq!(form.value_len(), 2);
    }

    #[test]
    fn pasted_newlines_become_spaces() {
        let mut form = TextForm::default();
        form.push_str("/a.png\n/b.png");
        assert_eq!(form.value, "/a.png /b.png");
    }
}
