use crate::error::Result;
use crate::protocol::registry::{PacketKind, PacketRegistry};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Write};
use uuid::Uuid;

/// Clientbound packet. The registry decides the numeric ID; the packet only
/// knows which kind it is and how to lay out its payload.
pub trait Packet {
    /// Registry key for this packet.
    fn kind(&self) -> PacketKind;

    /// Writes the payload (everything after the packet ID) to the buffer.
    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()>;
}

/// Serverbound packet with a fixed ID in the state it is read in.
pub trait ServerboundPacket: Sized {
    const PACKET_ID: i32;

    /// Reads the payload. The packet ID has already been consumed.
    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self>;
}

/// Serializes a packet into `[VarInt id][payload]`.
///
/// Fails with `UnregisteredPacket` when the registry has no ID for the
/// packet's kind, and with an IO error if the payload cannot be written.
pub fn serialize<P: Packet + ?Sized>(packet: &P, registry: &PacketRegistry) -> Result<Vec<u8>> {
    let packet_id = registry.packet_id(packet.kind())?;
    let mut buffer = MinecraftPacketBuffer::new();
    buffer.write_varint(packet_id);
    packet.write_to_buffer(&mut buffer)?;
    Ok(buffer.into_inner())
}

/// Converts degrees to a protocol angle byte.
///
/// `degrees * 256 / 360` is truncated towards zero into an i32 and then
/// wrapped into 8 bits, so 180 becomes -128 and 360 becomes 0. Out of range
/// values wrap, they are never clamped.
pub fn angle_to_byte(degrees: f32) -> i8 {
    (degrees * 256.0 / 360.0) as i32 as i8
}

/// Converts one velocity component (blocks per tick) to the wire short:
/// `round(component) * 8000`, wrapped into 16 bits.
pub fn velocity_to_short(component: f64) -> i16 {
    (component.round() as i32).wrapping_mul(8000) as i16
}

/// Minecraft packet buffer. Contains the buffer and the cursor.
/// Writes append to the end, reads consume from the cursor.
#[derive(Debug, Default)]
pub struct MinecraftPacketBuffer {
    pub buffer: Vec<u8>,
    cursor: usize,
}

impl MinecraftPacketBuffer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    /// Creates a new Minecraft packet buffer from a byte array.
    /// The cursor is initialized to 0.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            cursor: 0,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn get_buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    /// Number of unread bytes after the cursor.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor)
    }

    /// Returns the byte at the cursor without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.cursor).copied()
    }

    /// Writes a VarInt to the buffer.
    /// A VarInt is a variable-length integer. It is encoded using 7 bits per byte, with the most
    /// significant bit of each byte set to 1 unless it is the final byte. Groups are written
    /// least significant first; negative values always take five bytes.
    pub fn write_varint(&mut self, value: i32) {
        let mut value = value as u32;
        while (value & !0x7F) != 0 {
            self.buffer.push(((value & 0x7F) as u8) | 0x80);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    /// Reads a VarInt from the buffer. At most five bytes are consumed.
    pub fn read_varint(&mut self) -> io::Result<i32> {
        let mut result: u32 = 0;
        let mut shift = 0;

        loop {
            let byte = self.read_u8().map_err(|_| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "EOF while reading VarInt")
            })?;

            result |= ((byte & 0x7F) as u32) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                break;
            }

            if shift >= 35 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "VarInt too big"));
            }
        }

        Ok(result as i32)
    }

    /// Writes a string as its UTF-8 bytes prefixed by a VarInt byte length.
    pub fn write_string(&mut self, value: &str) {
        let bytes = value.as_bytes();
        self.write_varint(bytes.len() as i32);
        self.buffer.extend_from_slice(bytes);
    }

    pub fn read_string(&mut self) -> io::Result<String> {
        let length = self.read_varint()?;
        let length = usize::try_from(length)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Negative string length"))?;
        let bytes = self.read_bytes(length)?;
        String::from_utf8(bytes).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "Failed to convert bytes to UTF-8 string",
            )
        })
    }

    /// Writes a UUID as two big-endian longs, most significant half first.
    pub fn write_uuid(&mut self, value: Uuid) -> io::Result<()> {
        let (most, least) = value.as_u64_pair();
        self.buffer.write_u64::<BigEndian>(most)?;
        self.buffer.write_u64::<BigEndian>(least)
    }

    pub fn read_uuid(&mut self) -> io::Result<Uuid> {
        let most = self.read_u64()?;
        let least = self.read_u64()?;
        Ok(Uuid::from_u64_pair(most, least))
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.buffer.write_u16::<BigEndian>(value)
    }

    pub fn write_i16(&mut self, value: i16) -> io::Result<()> {
        self.buffer.write_i16::<BigEndian>(value)
    }

    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.buffer.write_i32::<BigEndian>(value)
    }

    pub fn write_i64(&mut self, value: i64) -> io::Result<()> {
        self.buffer.write_i64::<BigEndian>(value)
    }

    pub fn write_f32(&mut self, value: f32) -> io::Result<()> {
        self.buffer.write_f32::<BigEndian>(value)
    }

    pub fn write_f64(&mut self, value: f64) -> io::Result<()> {
        self.buffer.write_f64::<BigEndian>(value)
    }

    /// Writes an angle in degrees as a single byte, see [`angle_to_byte`].
    pub fn write_angle(&mut self, degrees: f32) {
        self.write_i8(angle_to_byte(degrees));
    }

    pub fn write_velocity(&mut self, component: f64) -> io::Result<()> {
        self.write_i16(velocity_to_short(component))
    }

    /// Writes a BitSet as a VarInt long count followed by the longs.
    pub fn write_bitset(&mut self, words: &[i64]) -> io::Result<()> {
        self.write_varint(words.len() as i32);
        for word in words {
            self.write_i64(*word)?;
        }
        Ok(())
    }

    /// Appends bytes without a length prefix.
    pub fn write_bytes_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let value = self.unread().read_u8()?;
        self.cursor += 1;
        Ok(value)
    }

    pub fn read_bool(&mut self) -> io::Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        let value = self.unread().read_u16::<BigEndian>()?;
        self.cursor += 2;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        let value = self.unread().read_i32::<BigEndian>()?;
        self.cursor += 4;
        Ok(value)
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        let value = self.unread().read_u64::<BigEndian>()?;
        self.cursor += 8;
        Ok(value)
    }

    pub fn read_i64(&mut self) -> io::Result<i64> {
        let value = self.unread().read_i64::<BigEndian>()?;
        self.cursor += 8;
        Ok(value)
    }

    pub fn read_f32(&mut self) -> io::Result<f32> {
        let value = self.unread().read_f32::<BigEndian>()?;
        self.cursor += 4;
        Ok(value)
    }

    pub fn read_f64(&mut self) -> io::Result<f64> {
        let value = self.unread().read_f64::<BigEndian>()?;
        self.cursor += 8;
        Ok(value)
    }

    pub fn read_bytes(&mut self, length: usize) -> io::Result<Vec<u8>> {
        if length > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Wanted {} bytes, {} left", length, self.remaining()),
            ));
        }
        let bytes = self.buffer[self.cursor..self.cursor + length].to_vec();
        self.cursor += length;
        Ok(bytes)
    }

    fn unread(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.buffer[self.cursor.min(self.buffer.len())..])
    }
}

impl Write for MinecraftPacketBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
