use super::packet::*;
use crate::protocol::component::json_text;
use crate::protocol::registry::PacketKind;
use std::io;
use uuid::Uuid;

pub struct LoginStartPacket {
    pub username: String,
    pub uuid: Uuid,
}

impl ServerboundPacket for LoginStartPacket {
    const PACKET_ID: i32 = 0x00;

    fn read_from_buffer(buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        let username = buffer.read_string()?;
        let uuid = buffer.read_uuid()?;
        Ok(LoginStartPacket { username, uuid })
    }
}

/// Client confirmation of login success; switches the connection state.
pub struct LoginAcknowledgedPacket;

impl ServerboundPacket for LoginAcknowledgedPacket {
    const PACKET_ID: i32 = 0x03;

    fn read_from_buffer(_buffer: &mut MinecraftPacketBuffer) -> io::Result<Self> {
        Ok(LoginAcknowledgedPacket)
    }
}

/// Offline-mode UUID: a v3 UUID of `OfflinePlayer:<name>`.
pub fn offline_uuid(username: &str) -> Uuid {
    Uuid::new_v3(
        &Uuid::NAMESPACE_DNS,
        format!("OfflinePlayer:{}", username).as_bytes(),
    )
}

#[derive(Debug, Clone)]
pub struct LoginSuccessPacket {
    pub uuid: Uuid,
    pub username: String,
    pub strict_error_handling: bool,
}

impl LoginSuccessPacket {
    pub fn new(uuid: Uuid, username: String) -> Self {
        LoginSuccessPacket {
            uuid,
            username,
            strict_error_handling: true,
        }
    }
}

impl Packet for LoginSuccessPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::LoginSuccess
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_uuid(self.uuid)?;
        buffer.write_string(&self.username);
        // Empty properties array as we're in offline mode
        buffer.write_varint(0);
        buffer.write_bool(self.strict_error_handling);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LoginDisconnectPacket {
    /// JSON text component.
    pub reason: String,
}

impl LoginDisconnectPacket {
    pub fn new(reason: &str) -> Self {
        LoginDisconnectPacket {
            reason: json_text(reason),
        }
    }
}

impl Packet for LoginDisconnectPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::LoginDisconnect
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        buffer.write_string(&self.reason);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_uuid_is_stable_v3() {
        let uuid = offline_uuid("Steve");
        assert_eq!(uuid, offline_uuid("Steve"));
        assert_ne!(uuid, offline_uuid("Alex"));
        assert_eq!(uuid.get_version_num(), 3);
    }

    #[test]
    fn test_login_success_layout() {
        let uuid = Uuid::from_u64_pair(1, 2);
        let mut buffer = MinecraftPacketBuffer::new();
        LoginSuccessPacket::new(uuid, "Bob".to_string())
            .write_to_buffer(&mut buffer)
            .unwrap();

        let mut read = MinecraftPacketBuffer::from_bytes(buffer.into_inner());
        assert_eq!(read.read_uuid().unwrap(), uuid);
        assert_eq!(read.read_string().unwrap(), "Bob");
        assert_eq!(read.read_varint().unwrap(), 0);
        assert!(read.read_bool().unwrap());
        assert_eq!(read.remaining(), 0);
    }

    #[test]
    fn test_read_login_start() {
        let mut buffer = MinecraftPacketBuffer::new();
        buffer.write_string("Steve");
        buffer.write_uuid(Uuid::from_u64_pair(3, 4)).unwrap();
        let mut read = MinecraftPacketBuffer::from_bytes(buffer.into_inner());
        let packet = LoginStartPacket::read_from_buffer(&mut read).unwrap();
        assert_eq!(packet.username, "Steve");
        assert_eq!(packet.uuid, Uuid::from_u64_pair(3, 4));
    }
}
