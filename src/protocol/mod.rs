pub mod boss_event;
pub mod center_chunk;
pub mod chunk_batch;
pub mod chunk_data;
pub mod clientbound;
pub mod component;
pub mod configuration;
pub mod entity_metadata;
pub mod frame;
pub mod game_event;
pub mod handshake;
pub mod join_game;
pub mod keep_alive;
pub mod login;
pub mod nbt;
pub mod packet;
pub mod player_movement;
pub mod registry;
pub mod remove_entities;
pub mod respawn;
pub mod spawn_entity;
pub mod status;
pub mod tab_complete;
pub mod unload_chunk;
