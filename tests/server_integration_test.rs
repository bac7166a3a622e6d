mod common;

use common::*;
use futures::future::join_all;
use limbo::config::{BossBarConfig, ServerProperties};
use limbo::protocol::login::offline_uuid;
use limbo::protocol::packet::MinecraftPacketBuffer;
use std::time::Duration;
use tokio::time::sleep;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_server_handshake_status() {
    let addr = start_server(test_properties()).await;
    let mut client = connect_to_server(addr).await;

    assert_ok!(send_handshake(&mut client, 1).await);
    assert_ok!(send_frame(&mut client, 0x00, |_| {}).await);

    let response = read_frame(&mut client).await.unwrap();
    assert_eq!(response.id, 0x00);
    let json = response.into_buffer().read_string().unwrap();
    assert_response_contains_status_fields(&json);
    let status: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(status["version"]["protocol"], 766);
    assert_eq!(status["players"]["max"], 10);

    assert_ok!(send_frame(&mut client, 0x01, |buffer| buffer.write_i64(42).unwrap()).await);
    let pong = read_frame(&mut client).await.unwrap();
    assert_eq!(pong.id, 0x01);
    assert_eq!(pong.into_buffer().read_i64().unwrap(), 42);
}

#[tokio::test]
async fn test_server_handshake_login() {
    let addr = start_server(test_properties()).await;
    let mut client = connect_to_server(addr).await;

    assert_ok!(send_handshake(&mut client, 2).await);
    assert_ok!(send_login_start(&mut client, "TestPlayer").await);

    let success = read_frame(&mut client).await.unwrap();
    assert_eq!(success.id, 0x02);
    let mut buffer: MinecraftPacketBuffer = success.into_buffer();
    assert_eq!(buffer.read_uuid().unwrap(), offline_uuid("TestPlayer"));
    assert_eq!(buffer.read_string().unwrap(), "TestPlayer");
}

#[tokio::test]
async fn test_joined_player_receives_chunk_batch() {
    let addr = start_server(test_properties()).await;
    let mut client = join(addr, "Streamer").await;

    let (_, before) = read_until(&mut client, 0x0D).await;
    assert!(before.iter().all(|frame| frame.id != 0x27));

    let (finished, between) = read_until(&mut client, 0x0C).await;
    let chunks = between.iter().filter(|frame| frame.id == 0x27).count();
    assert_eq!(chunks, 16);
    assert_eq!(finished.into_buffer().read_varint().unwrap(), 16);
}

#[tokio::test]
async fn test_join_runs_configuration_phase() {
    let addr = start_server(test_properties()).await;
    let mut client = log_in(addr, "Configured").await;

    let known_packs = read_frame(&mut client).await.unwrap();
    assert_eq!(known_packs.id, 0x0E);
    let mut buffer = known_packs.into_buffer();
    assert_eq!(buffer.read_varint().unwrap(), 1);
    assert_eq!(buffer.read_string().unwrap(), "minecraft");
    assert_eq!(buffer.read_string().unwrap(), "core");

    // Client information arrives before the known packs and is ignored
    assert_ok!(
        send_frame(&mut client, 0x00, |buffer| {
            buffer.write_string("en_us");
            buffer.write_u8(2);
        })
        .await
    );
    assert_ok!(send_vanilla_known_packs(&mut client).await);

    let (_, registries) = read_until(&mut client, 0x03).await;
    let names: Vec<String> = registries
        .into_iter()
        .map(|frame| {
            assert_eq!(frame.id, 0x07);
            frame.into_buffer().read_string().unwrap()
        })
        .collect();
    for required in [
        "minecraft:dimension_type",
        "minecraft:worldgen/biome",
        "minecraft:damage_type",
    ] {
        assert!(names.iter().any(|name| name == required), "{} not sent", required);
    }

    assert_ok!(send_frame(&mut client, 0x03, |_| {}).await);
    let join_game = read_frame(&mut client).await.unwrap();
    assert_eq!(join_game.id, 0x2B);
    let mut buffer = join_game.into_buffer();
    assert_eq!(buffer.read_i32().unwrap(), 1);
    assert!(!buffer.read_bool().unwrap());
    assert_eq!(buffer.read_varint().unwrap(), 1);
    assert_eq!(buffer.read_string().unwrap(), "minecraft:world");

    let (_, before_chunks) = read_until(&mut client, 0x0D).await;
    let ids: Vec<i32> = before_chunks.iter().map(|frame| frame.id).collect();
    assert_eq!(ids, vec![0x40, 0x22, 0x54]);
}

#[tokio::test]
async fn test_second_login_replaces_first_connection() {
    let properties = ServerProperties {
        commands: vec!["hub".to_string()],
        ..test_properties()
    };
    let addr = start_server(properties).await;
    let mut first = join(addr, "Twin").await;
    let mut second = join(addr, "Twin").await;

    while read_frame(&mut first).await.is_some() {}
    // The first connection's cleanup must leave the new session alone
    sleep(Duration::from_millis(200)).await;

    assert_ok!(
        send_frame(&mut second, 0x0B, |buffer| {
            buffer.write_varint(1);
            buffer.write_string("/h");
        })
        .await
    );
    let (response, _) = read_until(&mut second, 0x10).await;
    assert_eq!(response.into_buffer().read_varint().unwrap(), 1);

    let mut status = connect_to_server(addr).await;
    assert_ok!(send_handshake(&mut status, 1).await);
    assert_ok!(send_frame(&mut status, 0x00, |_| {}).await);
    let json = read_frame(&mut status).await.unwrap().into_buffer().read_string().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["players"]["online"], 1);
}

#[tokio::test]
async fn test_boss_bar_shown_on_join() {
    let properties = ServerProperties {
        boss_bar: Some(BossBarConfig {
            text: "Waiting for a server".to_string(),
            ..BossBarConfig::default()
        }),
        ..test_properties()
    };
    let addr = start_server(properties).await;
    let mut client = join(addr, "Watcher").await;

    let first = read_frame(&mut client).await.unwrap();
    assert_eq!(first.id, 0x0A);
    let mut buffer = first.into_buffer();
    buffer.read_uuid().unwrap();
    // ADD
    assert_eq!(buffer.read_varint().unwrap(), 0);
}

#[tokio::test]
async fn test_command_suggestions() {
    let properties = ServerProperties {
        commands: vec!["hub".to_string(), "leave".to_string()],
        ..test_properties()
    };
    let addr = start_server(properties).await;
    let mut client = join(addr, "Typist").await;

    assert_ok!(
        send_frame(&mut client, 0x0B, |buffer| {
            buffer.write_varint(5);
            buffer.write_string("/le");
        })
        .await
    );
    let (response, _) = read_until(&mut client, 0x10).await;
    let mut buffer = response.into_buffer();
    assert_eq!(buffer.read_varint().unwrap(), 5);
    assert_eq!(buffer.read_varint().unwrap(), 1);
    assert_eq!(buffer.read_varint().unwrap(), 2);
    assert_eq!(buffer.read_varint().unwrap(), 1);
    assert_eq!(buffer.read_string().unwrap(), "leave");
    assert!(!buffer.read_bool().unwrap());
}

#[tokio::test]
async fn test_full_server_rejects_login() {
    let properties = ServerProperties {
        max_players: 0,
        ..test_properties()
    };
    let addr = start_server(properties).await;
    let mut client = connect_to_server(addr).await;

    assert_ok!(send_handshake(&mut client, 2).await);
    assert_ok!(send_login_start(&mut client, "Latecomer").await);

    let disconnect = read_frame(&mut client).await.unwrap();
    assert_eq!(disconnect.id, 0x00);
    let reason = disconnect.into_buffer().read_string().unwrap();
    assert!(reason.contains("full"));
    assert!(read_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn test_server_invalid_handshake() {
    let addr = start_server(test_properties()).await;
    let mut client = connect_to_server(addr).await;

    // Transfers are not accepted
    assert_ok!(send_handshake(&mut client, 3).await);
    assert!(read_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn test_server_concurrent_connections() {
    let addr = start_server(test_properties()).await;

    let mut handles = Vec::new();
    for i in 0..5 {
        handles.push(tokio::spawn(async move {
            sleep(Duration::from_millis(i * 20)).await;

            let mut client = connect_to_server(addr).await;
            send_handshake(&mut client, 1).await.unwrap();
            send_frame(&mut client, 0x00, |_| {}).await.unwrap();
            let response = read_frame(&mut client).await.unwrap();
            response.into_buffer().read_string().unwrap()
        }));
    }

    for result in join_all(handles).await {
        assert_response_contains_status_fields(&result.unwrap());
    }
}
