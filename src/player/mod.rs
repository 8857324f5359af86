//! Playback timing used to preview a slide
//!
//! Captions are revealed one character at a time at the project's text
//! speed; audio position is shown as `m:ss`.

mod caption;
mod clock;

pub use caption::CaptionTicker;
pub use clock::format_time;
