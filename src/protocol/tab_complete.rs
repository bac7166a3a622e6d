use crate::protocol::component::Component;
use crate::protocol::packet::{MinecraftPacketBuffer, Packet, ServerboundPacket};
use crate::protocol::registry::PacketKind;
use std::io;

/// Client asks for completions of a partially typed command.
#[derive(Debug, Clone)]
pub struct CommandSuggestionRequestPacket {
    pub transaction_id: i32,
    pub text: String,
}

impl ServerboundPacket for CommandSuggestionRequestPacket {
    const PACKET_ID: i32 = 0x0B;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(CommandSuggestionRequestPacket {
            transaction_id: buffer.read_varint()?,
            text: buffer.read_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabCompleteMatch {
    pub text: String,
    pub tooltip: Option<Component>,
}

impl TabCompleteMatch {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: Component) -> Self {
        self.tooltip = Some(tooltip);
        self
    }
}

/// Completions for one request. `start` and `length` select the span of the
/// typed text the matches replace.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSuggestionsPacket {
    pub transaction_id: i32,
    pub start: i32,
    pub length: i32,
    pub matches: Vec<TabCompleteMatch>,
}

impl Packet for CommandSuggestionsPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::CommandSuggestions
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_varint(self.transaction_id);
        buffer.write_varint(self.start);
        buffer.write_varint(self.length);
        buffer.write_varint(self.matches.len() as i32);
        for suggestion in &self.matches {
            buffer.write_string(&suggestion.text);
            buffer.write_bool(suggestion.tooltip.is_some());
            if let Some(tooltip) = &suggestion.tooltip {
                buffer.write_bytes_raw(tooltip.as_bytes());
            }
        }
        Ok(())
    }
}

/// Builds the response for `text` from the known command names: every
/// command starting with the typed word. The replaced span is the word after
/// the leading slash.
pub fn suggest(transaction_id: i32, text: &str, commands: &[String]) -> CommandSuggestionsPacket {
    let typed = text.strip_prefix('/').unwrap_or(text);
    let start = (text.len() - typed.len()) as i32;
    let matches = if typed.contains(' ') {
        Vec::new()
    } else {
        commands
            .iter()
            .filter(|command| command.starts_with(typed))
            .map(|command| TabCompleteMatch::new(command))
            .collect()
    };
    CommandSuggestionsPacket {
        transaction_id,
        start,
        length: typed.len() as i32,
        matches,
    }
}
