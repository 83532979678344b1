//! Session runtime tests - protocol in, protocol out

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use tile_match::adapter::{
    run_session, InboundCommand, InboundMessage, OutboundMessage, SessionConfig, SessionHandle,
};
use tile_match::core::rng::CycleTypes;
use tile_match::core::{BoardLayout, EngineConfig, Grid, MatchEngine, MatchStats};
use tile_match::types::{CellType, Orientation};

type Session = (
    mpsc::Sender<InboundCommand>,
    mpsc::UnboundedReceiver<OutboundMessage>,
    tokio::task::JoinHandle<MatchStats>,
);

/// Session over a single `R R R` row that refills with green hearts.
fn start(playback_timeout: Option<Duration>) -> Session {
    let grid = Grid::from_layout(
        &[[CellType::RedStar; 3]],
        CycleTypes::constant(CellType::GreenHeart),
    )
    .unwrap();
    let engine = MatchEngine::new(grid, EngineConfig::default());
    let layout = BoardLayout::new(3, 1, Orientation::Portrait);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_session(engine, layout, playback_timeout, cmd_rx, out_tx));
    (cmd_tx, out_rx, task)
}

async fn send_line(tx: &mpsc::Sender<InboundCommand>, line: &str) {
    tx.send(InboundCommand::from_line(line)).await.unwrap();
}

async fn next_json(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for output")
        .expect("session closed");
    serde_json::from_str(&msg.to_line().unwrap()).unwrap()
}

async fn next_of_type(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>, ty: &str) -> Value {
    loop {
        let value = next_json(rx).await;
        if value["type"] == ty {
            return value;
        }
    }
}

#[tokio::test]
async fn test_match_flow_over_protocol() {
    let (tx, mut rx, task) = start(None);

    for x in 0..3 {
        send_line(&tx, &format!(r#"{{"type":"click_at","x":{},"y":0}}"#, x)).await;
    }

    for _ in 0..3 {
        assert_eq!(next_json(&mut rx).await["type"], "selected");
    }
    let outcome = next_json(&mut rx).await;
    assert_eq!(outcome["type"], "outcome");
    assert_eq!(outcome["result"], "success");
    assert_eq!(outcome["kind"], "red_star");

    let cascade = next_json(&mut rx).await;
    assert_eq!(cascade["type"], "cascade");
    assert_eq!(cascade["removed"].as_array().unwrap().len(), 3);
    assert_eq!(cascade["spawned"].as_array().unwrap().len(), 3);
    assert_eq!(cascade["spawned"][0]["kind"], "green_heart");

    assert_eq!(next_json(&mut rx).await["type"], "awaiting_playback");

    // Busy until playback is acknowledged.
    send_line(&tx, r#"{"type":"click_at","x":0,"y":0}"#).await;
    let ignored = next_json(&mut rx).await;
    assert_eq!(ignored["type"], "ignored");
    assert_eq!(ignored["reason"], "busy");

    send_line(&tx, r#"{"type":"playback_done"}"#).await;
    assert_eq!(next_json(&mut rx).await["type"], "ready");

    send_line(&tx, r#"{"type":"quit"}"#).await;
    let stats = task.await.unwrap();
    assert_eq!(stats.matches, 1);
    assert_eq!(stats.cells_cleared, 3);
}

#[tokio::test]
async fn test_seq_is_monotonic() {
    let (tx, mut rx, task) = start(None);
    send_line(&tx, r#"{"type":"click","id":0}"#).await;
    send_line(&tx, r#"{"type":"click","id":0}"#).await;
    send_line(&tx, r#"{"type":"snapshot"}"#).await;

    let mut last = 0;
    for _ in 0..3 {
        let seq = next_json(&mut rx).await["seq"].as_u64().unwrap();
        assert!(seq > last);
        last = seq;
    }

    drop(tx);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_playback_timeout_releases_latch() {
    let (tx, mut rx, task) = start(Some(Duration::from_millis(1000)));

    for id in 0..3 {
        send_line(&tx, &format!(r#"{{"type":"click","id":{}}}"#, id)).await;
    }
    next_of_type(&mut rx, "awaiting_playback").await;

    // No acknowledgement: the session opens the latch on its own.
    let ready = next_of_type(&mut rx, "ready").await;
    assert_eq!(ready["type"], "ready");

    send_line(&tx, r#"{"type":"click_at","x":1,"y":0}"#).await;
    let selected = next_json(&mut rx).await;
    assert_eq!(selected["type"], "selected");
    assert_eq!(selected["cell"]["kind"], "green_heart");

    drop(tx);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_busy_clicks_do_not_extend_timeout() {
    let (tx, mut rx, task) = start(Some(Duration::from_millis(1000)));

    for id in 0..3 {
        send_line(&tx, &format!(r#"{{"type":"click","id":{}}}"#, id)).await;
    }
    next_of_type(&mut rx, "awaiting_playback").await;

    tokio::time::sleep(Duration::from_millis(600)).await;
    send_line(&tx, r#"{"type":"click_at","x":0,"y":0}"#).await;
    assert_eq!(next_json(&mut rx).await["reason"], "busy");

    let started = tokio::time::Instant::now();
    next_of_type(&mut rx, "ready").await;
    assert!(started.elapsed() <= Duration::from_millis(400));

    drop(tx);
    task.await.unwrap();
}

#[tokio::test]
async fn test_errors_do_not_end_session() {
    let (tx, mut rx, task) = start(None);

    send_line(&tx, "this is not json").await;
    let err = next_json(&mut rx).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "invalid_message");

    send_line(&tx, r#"{"type":"click","id":77}"#).await;
    assert_eq!(next_json(&mut rx).await["code"], "unknown_cell");

    send_line(&tx, r#"{"type":"click_at","x":9,"y":0}"#).await;
    assert_eq!(next_json(&mut rx).await["code"], "out_of_bounds");

    send_line(&tx, r#"{"type":"resize","width":0,"height":4}"#).await;
    assert_eq!(next_json(&mut rx).await["code"], "invalid_dimensions");

    send_line(&tx, r#"{"type":"click","id":1}"#).await;
    assert_eq!(next_json(&mut rx).await["type"], "selected");

    drop(tx);
    task.await.unwrap();
}

#[tokio::test]
async fn test_orientation_rebuilds_only_on_change() {
    let (tx, mut rx, task) = start(None);

    send_line(&tx, r#"{"type":"orientation","orientation":"portrait"}"#).await;
    send_line(&tx, r#"{"type":"orientation","orientation":"landscape"}"#).await;
    let rebuilt = next_json(&mut rx).await;
    assert_eq!(rebuilt["type"], "rebuilt");
    assert_eq!((rebuilt["width"].as_u64(), rebuilt["height"].as_u64()), (Some(1), Some(3)));

    send_line(&tx, r#"{"type":"snapshot"}"#).await;
    let snapshot = next_json(&mut rx).await;
    assert_eq!(snapshot["orientation"], "landscape");
    assert_eq!(snapshot["cells"].as_array().unwrap().len(), 3);
    assert_eq!(snapshot["state"], "idle");

    drop(tx);
    task.await.unwrap();
}

#[tokio::test]
async fn test_reset_clears_selection() {
    let (tx, mut rx, task) = start(None);

    send_line(&tx, r#"{"type":"click","id":2}"#).await;
    assert_eq!(next_json(&mut rx).await["type"], "selected");

    send_line(&tx, r#"{"type":"reset"}"#).await;
    let deselected = next_json(&mut rx).await;
    assert_eq!(deselected["type"], "deselected");
    assert_eq!(deselected["id"], 2);

    send_line(&tx, r#"{"type":"snapshot"}"#).await;
    let snapshot = next_json(&mut rx).await;
    assert!(snapshot["selection"].as_array().unwrap().is_empty());

    drop(tx);
    task.await.unwrap();
}

#[tokio::test]
async fn test_handle_from_config() {
    let config = SessionConfig {
        layout: BoardLayout::new(4, 5, Orientation::Landscape),
        seed: 9,
        ..SessionConfig::default()
    };
    let mut handle = SessionHandle::spawn(&config).unwrap();

    handle.send(InboundMessage::Snapshot).await.unwrap();
    let msg = handle.recv().await.unwrap();
    let value: Value = serde_json::from_str(&msg.to_line().unwrap()).unwrap();
    assert_eq!(value["width"], 5);
    assert_eq!(value["height"], 4);
    assert_eq!(value["cells"].as_array().unwrap().len(), 20);

    let (stats, rest) = handle.shutdown().await.unwrap();
    assert_eq!(stats, MatchStats::default());
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_oversized_resize_is_rejected() {
    let mut handle = SessionHandle::spawn(&SessionConfig::default()).unwrap();

    handle
        .send(InboundCommand::from_line(
            r#"{"type":"resize","width":65535,"height":65535}"#,
        ))
        .await
        .unwrap();
    let msg = handle.recv().await.unwrap();
    let value: Value = serde_json::from_str(&msg.to_line().unwrap()).unwrap();
    assert_eq!(value["type"], "error");
    assert_eq!(value["code"], "invalid_dimensions");

    // The board is untouched and the session still answers.
    handle.send(InboundMessage::Snapshot).await.unwrap();
    let msg = handle.recv().await.unwrap();
    let value: Value = serde_json::from_str(&msg.to_line().unwrap()).unwrap();
    assert_eq!((value["width"].as_u64(), value["height"].as_u64()), (Some(8), Some(10)));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_orientation_after_resize_swaps_new_size() {
    let (tx, mut rx, task) = start(None);

    send_line(&tx, r#"{"type":"resize","width":4,"height":6}"#).await;
    let rebuilt = next_of_type(&mut rx, "rebuilt").await;
    assert_eq!((rebuilt["width"].as_u64(), rebuilt["height"].as_u64()), (Some(4), Some(6)));

    send_line(&tx, r#"{"type":"orientation","orientation":"landscape"}"#).await;
    let rebuilt = next_of_type(&mut rx, "rebuilt").await;
    assert_eq!((rebuilt["width"].as_u64(), rebuilt["height"].as_u64()), (Some(6), Some(4)));

    send_line(&tx, r#"{"type":"snapshot"}"#).await;
    let snapshot = next_json(&mut rx).await;
    assert_eq!(snapshot["orientation"], "landscape");
    assert_eq!((snapshot["width"].as_u64(), snapshot["height"].as_u64()), (Some(6), Some(4)));
    assert_eq!(snapshot["cells"].as_array().unwrap().len(), 24);

    drop(tx);
    task.await.unwrap();
}
