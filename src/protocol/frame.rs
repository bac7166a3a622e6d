use crate::protocol::packet::MinecraftPacketBuffer;
use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// Largest frame either side may send (2 MiB, same as vanilla).
pub const MAX_FRAME_SIZE: usize = 2 * 1024 * 1024;

/// One uncompressed frame: the packet ID and the bytes after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub id: i32,
    pub payload: Vec<u8>,
}

impl RawPacket {
    pub fn into_buffer(self) -> MinecraftPacketBuffer {
        MinecraftPacketBuffer::from_bytes(self.payload)
    }
}

/// VarInt length-prefixed framing. Decodes into `RawPacket`s and encodes
/// already serialized `[id][payload]` bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

/// Reads a VarInt from the front of `src` without consuming it. `Ok(None)`
/// means more bytes are needed.
fn peek_varint(src: &[u8]) -> io::Result<Option<(i32, usize)>> {
    let mut value: u32 = 0;
    for (position, byte) in src.iter().enumerate().take(5) {
        value |= ((byte & 0x7F) as u32) << (7 * position);
        if byte & 0x80 == 0 {
            return Ok(Some((value as i32, position + 1)));
        }
    }
    if src.len() >= 5 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "VarInt too long"));
    }
    Ok(None)
}

fn frame_length(length: i32) -> io::Result<usize> {
    let length = usize::try_from(length)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Negative frame length"))?;
    if length > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Frame of {} bytes exceeds {}", length, MAX_FRAME_SIZE),
        ));
    }
    Ok(length)
}

impl Decoder for FrameCodec {
    type Item = RawPacket;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<RawPacket>> {
        let Some((length, header)) = peek_varint(src)? else {
            return Ok(None);
        };
        let length = frame_length(length)?;
        if src.len() < header + length {
            src.reserve(header + length - src.len());
            return Ok(None);
        }

        src.advance(header);
        let frame = src.split_to(length);
        let mut buffer = MinecraftPacketBuffer::from_bytes(frame.to_vec());
        let id = buffer.read_varint()?;
        let payload = buffer.read_bytes(buffer.remaining())?;
        Ok(Some(RawPacket { id, payload }))
    }
}

impl Encoder<Vec<u8>> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, packet: Vec<u8>, dst: &mut BytesMut) -> io::Result<()> {
        frame_length(i32::try_from(packet.len()).unwrap_or(i32::MAX))?;
        let mut header = MinecraftPacketBuffer::new();
        header.write_varint(packet.len() as i32);
        dst.reserve(header.get_buffer().len() + packet.len());
        dst.put_slice(header.get_buffer());
        dst.put_slice(&packet);
        Ok(())
    }
}
