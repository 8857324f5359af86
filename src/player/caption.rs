/// Typewriter-style caption reveal.
///
/// With a speed of `n` ms per character, `floor(elapsed / n)` characters are
/// visible after `elapsed` ms. A speed of 0 shows the whole caption at once.
#[derive(Debug, Clone)]
pub struct CaptionTicker<'a> {
    text: &'a str,
    speed_ms: u32,
    char_count: usize,
}

impl<'a> CaptionTicker<'a> {
    pub fn new(text: &'a str, speed_ms: u32) -> Self {
        Self {
            text,
            speed_ms,
            char_count: text.chars().count(),
        }
    }

    /// Number of characters shown after `elapsed_ms`
    pub fn visible_chars(&self, elapsed_ms: u64) -> usize {
        if self.speed_ms == 0 {
            return self.char_count;
        }
        let shown = elapsed_ms / u64::from(self.speed_ms);
        usize::try_from(shown)
            .unwrap_or(usize::MAX)
            .min(self.char_count)
    }

    /// The caption prefix shown after `elapsed_ms`
    pub fn visible_at(&self, elapsed_ms: u64) -> &'a str {
        let chars = self.visible_chars(elapsed_ms);
        match self.text.char_indices().nth(chars) {
            Some((byte, _)) => &self.text[..byte],
            None => self.text,
        }
    }

    pub fn is_complete(&self, elapsed_ms: u64) -> bool {
        self.visible_chars(elapsed_ms) == self.char_count
    }

    /// Time until the last character appears
    pub fn duration_ms(&self) -> u64 {
        self.char_count as u64 * u64::from(self.speed_ms)
    }
}
