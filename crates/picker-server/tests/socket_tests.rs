//! Coordinator and displays talking over a real socket.

use std::{fs, path::PathBuf, time::Duration};

use picker_display::{Display, PickerView, UrlBarView};
use picker_engine::{
    Coordinator, CoordinatorHandle,
    test_support::{MockCollaborators, wait_until},
};
use picker_protocol::{Action, CanonicalState, Lane, add_channel_to_action};
use picker_server::{Connection, Server};

fn socket_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "picker-server-test-{}-{}",
        std::process::id(),
        name
    ));
    fs::create_dir_all(&dir).unwrap();
    dir.join("picker.sock")
}

fn start(name: &str) -> (CoordinatorHandle, MockCollaborators, PathBuf) {
    let mock = MockCollaborators::new();
    let (coordinator, handle) = Coordinator::new(mock.clone());
    coordinator.spawn();
    let path = socket_path(name);
    let server = Server::bind(&path, handle.clone()).unwrap();
    tokio::spawn(server.run());
    (handle, mock, path)
}

/// Read snapshots until one satisfies `pred`.
async fn recv_synced<F>(conn: &mut Connection, pred: F) -> bool
where
    F: Fn(&CanonicalState) -> bool,
{
    tokio::time::timeout(Duration::from_millis(1000), async {
        while let Ok(Some(envelope)) = conn.recv().await {
            if let Some(Action::SyncedState(state)) = envelope.accept(Lane::Main)
                && pred(&state)
            {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false)
}

#[tokio::test]
async fn handshake_yields_snapshot() {
    let (handle, _mock, path) = start("snapshot");
    handle.dispatch(Action::OpenedUrl("http://example.com/".into()));
    let mut conn = Connection::connect(&path, Lane::UrlBar).await.unwrap();
    assert_eq!(conn.lane(), Lane::UrlBar);
    assert!(recv_synced(&mut conn, |s| s.url == "http://example.com/").await);
}

#[tokio::test]
async fn intents_reach_the_coordinator() {
    let (handle, mock, path) = start("intents");
    handle.dispatch(Action::retrieved_installed_apps(["org.mozilla.firefox"]));
    let mut conn = Connection::connect(&path, Lane::Picker).await.unwrap();
    assert!(recv_synced(&mut conn, |s| s.apps.len() == 1).await);

    conn.send(Action::clicked_app("org.mozilla.firefox", true, false))
        .await
        .unwrap();
    assert!(wait_until(1000, || mock.launches().len() == 1).await);
    assert!(mock.launches()[0].is_alt);
}

#[tokio::test]
async fn mistagged_frames_are_dropped() {
    let (handle, mock, path) = start("mistagged");
    handle.dispatch(Action::retrieved_installed_apps(["org.mozilla.firefox"]));
    let mut conn = Connection::connect(&path, Lane::Picker).await.unwrap();
    assert!(recv_synced(&mut conn, |s| s.apps.len() == 1).await);

    let click = Action::clicked_app("org.mozilla.firefox", false, false);
    conn.send_envelope(&add_channel_to_action(click, Lane::UrlBar))
        .await
        .unwrap();
    conn.send(Action::ClickedCopyUrl).await.unwrap();
    conn.send(Action::CompletedSetup).await.unwrap();
    // The later setup intent landing proves the earlier frame was processed.
    assert!(recv_synced(&mut conn, |s| s.is_setup).await);
    assert!(mock.launches().is_empty());
}

#[tokio::test]
async fn broadcasts_fan_out_over_sockets() {
    let (handle, _mock, path) = start("fanout");
    let mut picker = Connection::connect(&path, Lane::Picker).await.unwrap();
    let mut bar = Connection::connect(&path, Lane::UrlBar).await.unwrap();
    assert!(recv_synced(&mut picker, |_| true).await);
    assert!(recv_synced(&mut bar, |_| true).await);

    handle.dispatch(Action::OpenedUrl("https://example.com/a".into()));
    assert!(recv_synced(&mut picker, |s| s.url == "https://example.com/a").await);
    assert!(recv_synced(&mut bar, |s| s.url == "https://example.com/a").await);
}

#[tokio::test]
async fn display_adapters_work_over_the_socket() {
    let (handle, mock, path) = start("adapters");
    let picker_link = Connection::connect(&path, Lane::Picker)
        .await
        .unwrap()
        .into_link();
    let bar_link = Connection::connect(&path, Lane::UrlBar)
        .await
        .unwrap()
        .into_link();
    let mut picker = Display::<PickerView>::new(picker_link.outbox).unwrap();
    let mut picker_rx = picker_link.inbox;
    let mut bar = Display::<UrlBarView>::new(bar_link.outbox).unwrap();
    let mut bar_rx = bar_link.inbox;

    handle.dispatch(Action::retrieved_installed_apps(["org.mozilla.firefox"]));
    handle.dispatch(Action::OpenedUrl("https://example.com/a/b".into()));

    let ready = tokio::time::timeout(Duration::from_millis(1000), async {
        while let Some(view) = bar.next_update(&mut bar_rx).await {
            if !view.is_empty() {
                return true;
            }
        }
        false
    });
    assert!(ready.await.unwrap_or(false));
    bar.send_opt(bar.view().copy());
    assert!(wait_until(1000, || mock.clipboard() == ["https://example.com/a/b"]).await);

    let tiles = tokio::time::timeout(Duration::from_millis(1000), async {
        while let Some(view) = picker.next_update(&mut picker_rx).await {
            if !view.tiles().is_empty() && !view.url().is_empty() {
                return true;
            }
        }
        false
    });
    assert!(tiles.await.unwrap_or(false));
    picker.send_opt(picker.view().click("org.mozilla.firefox", false, true));
    assert!(wait_until(1000, || mock.launches().len() == 1).await);
    assert_eq!(mock.launches()[0].url, "https://example.com/a/b");
}

#[tokio::test]
async fn disconnected_display_is_pruned() {
    let (handle, _mock, path) = start("prune");
    let mut keep = Connection::connect(&path, Lane::Picker).await.unwrap();
    let gone = Connection::connect(&path, Lane::UrlBar).await.unwrap();
    assert!(recv_synced(&mut keep, |_| true).await);
    drop(gone);

    handle.dispatch(Action::OpenedUrl("http://one.example/".into()));
    handle.dispatch(Action::OpenedUrl("http://two.example/".into()));
    assert!(recv_synced(&mut keep, |s| s.url == "http://two.example/").await);
}

#[tokio::test]
async fn bind_refuses_regular_file() {
    let mock = MockCollaborators::new();
    let (_coordinator, handle) = Coordinator::new(mock);
    let path = socket_path("regular");
    fs::write(&path, b"not a socket").unwrap();
    assert!(Server::bind(&path, handle).is_err());
    assert!(path.exists());
}
