use crate::protocol::component::Component;
use crate::protocol::packet::{MinecraftPacketBuffer, Packet};
use crate::protocol::registry::PacketKind;
use serde::Deserialize;
use std::io;
use uuid::Uuid;

/// Boss bar operation. The numbers are the wire tags and are fixed by the
/// protocol; never renumber or reorder them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum BossBarAction {
    Add = 0,
    Remove = 1,
    UpdateProgress = 2,
    UpdateName = 3,
    UpdateStyle = 4,
    UpdateProperties = 5,
}

impl BossBarAction {
    pub fn id(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum BossBarColor {
    #[default]
    Pink = 0,
    Blue = 1,
    Red = 2,
    Green = 3,
    Yellow = 4,
    Purple = 5,
    White = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum BossBarOverlay {
    #[default]
    Progress = 0,
    #[serde(rename = "notched_6")]
    Notched6 = 1,
    #[serde(rename = "notched_10")]
    Notched10 = 2,
    #[serde(rename = "notched_12")]
    Notched12 = 3,
    #[serde(rename = "notched_20")]
    Notched20 = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct BossBarFlags {
    pub darken_screen: bool,
    pub play_music: bool,
    pub create_fog: bool,
}

impl BossBarFlags {
    /// Bit 0 darken screen, bit 1 play music, bit 2 fog.
    pub fn encode(self) -> u8 {
        let mut flags = 0;
        if self.darken_screen {
            flags |= 0x01;
        }
        if self.play_music {
            flags |= 0x02;
        }
        if self.create_fog {
            flags |= 0x04;
        }
        flags
    }
}

/// Server-side state of one boss bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BossBar {
    pub uuid: Uuid,
    pub name: Component,
    pub progress: f32,
    pub color: BossBarColor,
    pub overlay: BossBarOverlay,
    pub flags: BossBarFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossEventPacket {
    pub action: BossBarAction,
    pub bar: BossBar,
}

impl BossEventPacket {
    pub fn new(action: BossBarAction, bar: BossBar) -> Self {
        Self { action, bar }
    }
}

impl Packet for BossEventPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::BossEvent
    }

    fn write_to_buffer(&self, buffer: &mut MinecraftPacketBuffer) -> io::Result<()> {
        let bar = &self.bar;
        buffer.write_uuid(bar.uuid)?;
        buffer.write_varint(self.action.id());
        match self.action {
            BossBarAction::Add => {
                buffer.write_bytes_raw(bar.name.as_bytes());
                buffer.write_f32(bar.progress)?;
                buffer.write_varint(bar.color as i32);
                buffer.write_varint(bar.overlay as i32);
                buffer.write_u8(bar.flags.encode());
            }
            BossBarAction::Remove => {}
            BossBarAction::UpdateProgress => buffer.write_f32(bar.progress)?,
            BossBarAction::UpdateName => buffer.write_bytes_raw(bar.name.as_bytes()),
            BossBarAction::UpdateStyle => {
                buffer.write_varint(bar.color as i32);
                buffer.write_varint(bar.overlay as i32);
            }
            BossBarAction::UpdateProperties => buffer.write_u8(bar.flags.encode()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> BossBar {
        BossBar {
            uuid: Uuid::from_u64_pair(0, 9),
            name: Component::text("Queue"),
            progress: 0.5,
            color: BossBarColor::Green,
            overlay: BossBarOverlay::Notched10,
            flags: BossBarFlags {
                darken_screen: true,
                play_music: false,
                create_fog: true,
            },
        }
    }

    fn payload(action: BossBarAction) -> Vec<u8> {
        let mut buffer = MinecraftPacketBuffer::new();
        BossEventPacket::new(action, bar())
            .write_to_buffer(&mut buffer)
            .unwrap();
        // Skip uuid and action tag
        buffer.into_inner()[17..].to_vec()
    }

    #[test]
    fn test_flags_bits() {
        assert_eq!(bar().flags.encode(), 0b101);
        assert_eq!(BossBarFlags::default().encode(), 0);
        let all = BossBarFlags {
            darken_screen: true,
            play_music: true,
            create_fog: true,
        };
        assert_eq!(all.encode(), 0b111);
    }

    #[test]
    fn test_action_tags_are_fixed() {
        assert_eq!(BossBarAction::Add.id(), 0);
        assert_eq!(BossBarAction::Remove.id(), 1);
        assert_eq!(BossBarAction::UpdateProgress.id(), 2);
        assert_eq!(BossBarAction::UpdateName.id(), 3);
        assert_eq!(BossBarAction::UpdateStyle.id(), 4);
        assert_eq!(BossBarAction::UpdateProperties.id(), 5);
    }

    #[test]
    fn test_add_field_order() {
        let mut expected = Component::text("Queue").as_bytes().to_vec();
        expected.extend_from_slice(&0.5f32.to_be_bytes());
        expected.extend_from_slice(&[3, 2, 5]);
        assert_eq!(payload(BossBarAction::Add), expected);
    }

    #[test]
    fn test_other_actions() {
        assert!(payload(BossBarAction::Remove).is_empty());
        assert_eq!(payload(BossBarAction::UpdateProgress), 0.5f32.to_be_bytes().to_vec());
        assert_eq!(payload(BossBarAction::UpdateName), Component::text("Queue").as_bytes().to_vec());
        assert_eq!(payload(BossBarAction::UpdateStyle), vec![3, 2]);
        assert_eq!(payload(BossBarAction::UpdateProperties), vec![5]);
    }

    #[test]
    fn test_style_names_deserialize() {
        let color: BossBarColor = serde_json::from_str("\"purple\"").unwrap();
        let overlay: BossBarOverlay = serde_json::from_str("\"notched_12\"").unwrap();
        assert_eq!(color, BossBarColor::Purple);
        assert_eq!(overlay, BossBarOverlay::Notched12);
    }
}
