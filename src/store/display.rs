//! Display handles for the rendering surface
//!
//! A surface turns decoded media into something it can draw (an object URL,
//! a texture, ...). Handles are process-local and never stored in a document.

/// Creates and revokes renderable handles for decoded media
pub trait DisplaySurface {
    type Handle;

    fn create(&mut self, bytes: &[u8], mime_type: &str) -> Self::Handle;

    fn revoke(&mut self, handle: Self::Handle);
}

/// Surface for headless use: handles carry only the payload size
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl DisplaySurface for Headless {
    type Handle = usize;

    fn create(&mut self, bytes: &[u8], _mime_type: &str) -> usize {
        bytes.len()
    }

    fn revoke(&mut self, _handle: usize) {}
}
