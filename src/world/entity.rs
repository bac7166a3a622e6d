use crate::protocol::component::Component;
use crate::world::chunk::WorldId;
use uuid::Uuid;

/// Entity type, as its index in the `minecraft:entity_type` registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType(pub i32);

impl EntityType {
    pub const ARMOR_STAND: EntityType = EntityType(3);
    pub const PLAYER: EntityType = EntityType(128);

    pub fn type_id(self) -> i32 {
        self.0
    }
}

/// A position inside a world, with orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Location {
    pub fn new(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self {
            world,
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn with_rotation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    pub fn distance_squared(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Chunk column of this location: the coordinate is truncated to an
    /// integer first and then shifted, so -0.5 lands in chunk 0.
    pub fn chunk_x(&self) -> i32 {
        (self.x as i32) >> 4
    }

    pub fn chunk_z(&self) -> i32 {
        (self.z as i32) >> 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Entity metadata value, tagged with its serializer ID on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Byte(i8),
    VarInt(i32),
    Float(f32),
    String(String),
    Component(Component),
    OptionalComponent(Option<Component>),
    Boolean(bool),
}

impl MetadataValue {
    pub fn serializer_id(&self) -> i32 {
        match self {
            MetadataValue::Byte(_) => 0,
            MetadataValue::VarInt(_) => 1,
            MetadataValue::Float(_) => 3,
            MetadataValue::String(_) => 4,
            MetadataValue::Component(_) => 5,
            MetadataValue::OptionalComponent(_) => 6,
            MetadataValue::Boolean(_) => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    pub index: u8,
    pub value: MetadataValue,
}

impl MetadataEntry {
    pub fn new(index: u8, value: MetadataValue) -> Self {
        Self { index, value }
    }
}

/// What the world knows about one entity at the start of a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub entity_type: EntityType,
    pub location: Location,
    pub head_yaw: f32,
    pub data: i32,
    pub velocity: Vector,
    pub metadata: Vec<MetadataEntry>,
}

impl EntitySnapshot {
    pub fn new(entity_id: i32, uuid: Uuid, entity_type: EntityType, location: Location) -> Self {
        Self {
            entity_id,
            uuid,
            entity_type,
            location,
            head_yaw: location.yaw,
            data: 0,
            velocity: Vector::ZERO,
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, entry: MetadataEntry) -> Self {
        self.metadata.push(entry);
        self
    }
}
