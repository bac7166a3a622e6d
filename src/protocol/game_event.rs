use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use std::io;

/// Game event IDs used by this server. Numbered by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GameEvent {
    /// Lets the client leave the loading screen once chunks arrive.
    StartWaitingForChunks = 13,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameEventPacket {
    pub event: GameEvent,
    pub value: f32,
}

impl GameEventPacket {
    pub fn new(event: GameEvent) -> Self {
        Self { event, value: 0.0 }
    }
}

impl Packet for GameEventPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::GameEvent
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_u8(self.event as u8);
        buffer.write_f32(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_waiting_for_chunks() {
        let mut buffer = MinecraftPacketBuffer::new();
        GameEventPacket::new(GameEvent::StartWaitingForChunks)
            .write_to_buffer(&mut buffer)
            .unwrap();
        assert_eq!(buffer.buffer, vec![13, 0, 0, 0, 0]);
    }
}
