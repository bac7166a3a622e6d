/// Longest text an NBT string tag can carry, in UTF-8 bytes.
pub const MAX_TEXT_BYTES: usize = u16::MAX as usize;

const STRING_TAG: u8 = 8;

/// A text component already encoded for the wire.
///
/// Rich text is owned by the chat layer; packets only copy these bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Component(Vec<u8>);

impl Component {
    pub fn from_encoded(bytes: Vec<u8>) -> Self {
        Component(bytes)
    }

    /// Plain text, sent as a network NBT string tag.
    ///
    /// Text longer than [`MAX_TEXT_BYTES`] is cut at the last character
    /// boundary that fits.
    pub fn text(text: &str) -> Self {
        let text = truncate(text, MAX_TEXT_BYTES);
        let mut bytes = Vec::with_capacity(text.len() + 3);
        bytes.push(STRING_TAG);
        bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
        bytes.extend_from_slice(text.as_bytes());
        Component(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn truncate(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Plain text as a JSON chat component, for the states that still use JSON.
pub fn json_text(text: &str) -> String {
    serde_json::json!({ "text": text }).to_string()
}
