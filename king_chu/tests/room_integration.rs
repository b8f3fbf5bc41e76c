//! Room actor integration tests: message round-trips, notification
//! fan-out, and disconnect handling.

use king_chu::game::{ActionError, Phase, PlayerId};
use king_chu::room::{RoomActor, RoomHandle, RoomMessage, RoomNotification, RoomResponse};
use tokio::sync::{mpsc, oneshot};

async fn join(handle: &RoomHandle, name: &str) -> Result<PlayerId, ActionError> {
    let (tx, rx) = oneshot::channel();
    handle
        .send(RoomMessage::Join {
            name: name.to_string(),
            response: tx,
        })
        .await
        .unwrap();
    rx.await.unwrap()
}

async fn join_four(handle: &RoomHandle) -> Vec<PlayerId> {
    let mut ids = Vec::new();
    for name in ["alice", "bob", "carol", "dave"] {
        ids.push(join(handle, name).await.unwrap());
    }
    ids
}

async fn start_game(handle: &RoomHandle, player_id: PlayerId) -> RoomResponse {
    let (tx, rx) = oneshot::channel();
    handle
        .send(RoomMessage::StartGame {
            player_id,
            response: tx,
        })
        .await
        .unwrap();
    rx.await.unwrap()
}

async fn get_view(handle: &RoomHandle, player_id: PlayerId) -> Option<king_chu::GameView> {
    let (tx, rx) = oneshot::channel();
    handle
        .send(RoomMessage::GetView {
            player_id,
            response: tx,
        })
        .await
        .unwrap();
    rx.await.unwrap()
}

#[tokio::test]
async fn join_start_and_view_round_trip() {
    let (actor, handle) = RoomActor::new();
    tokio::spawn(actor.run());

    let ids = join_four(&handle).await;
    assert_eq!(join(&handle, "eve").await, Err(ActionError::RoomFull));

    assert_eq!(
        start_game(&handle, ids[1]).await,
        RoomResponse::Rejected(ActionError::NotHost)
    );
    assert!(start_game(&handle, ids[0]).await.is_success());

    let view = get_view(&handle, ids[0]).await.unwrap();
    assert_eq!(view.phase, Phase::Bidding);
    assert_eq!(view.round_number, 1);
    assert_eq!(view.player_count, 4);
    assert_eq!(view.hand.len(), 1);
    for player in &view.players {
        assert_eq!(player.hand_size, 1);
    }
}

#[tokio::test]
async fn subscribers_receive_state_changes_and_chat() {
    let (actor, handle) = RoomActor::new();
    tokio::spawn(actor.run());

    let alice = join(&handle, "alice").await.unwrap();
    let bob = join(&handle, "bob").await.unwrap();

    let (tx, mut notifications) = mpsc::channel(16);
    handle
        .send(RoomMessage::Subscribe {
            player_id: bob,
            sender: tx,
        })
        .await
        .unwrap();

    handle
        .send(RoomMessage::Chat {
            player_id: alice,
            text: "hello".to_string(),
        })
        .await
        .unwrap();

    // The subscription is primed with a StateChanged; scan forward to the
    // relayed chat line.
    loop {
        match notifications.recv().await.unwrap() {
            RoomNotification::Chat { from, text } => {
                assert_eq!(from.as_str(), "alice");
                assert_eq!(text, "hello");
                break;
            }
            RoomNotification::StateChanged | RoomNotification::Event(_) => {}
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    // Chat never advances the game.
    let view = get_view(&handle, alice).await.unwrap();
    assert_eq!(view.phase, Phase::Waiting);
}

#[tokio::test]
async fn disconnect_mid_game_aborts_for_everyone() {
    let (actor, handle) = RoomActor::new();
    tokio::spawn(actor.run());

    let ids = join_four(&handle).await;

    let (tx, mut notifications) = mpsc::channel(64);
    handle
        .send(RoomMessage::Subscribe {
            player_id: ids[0],
            sender: tx,
        })
        .await
        .unwrap();

    assert!(start_game(&handle, ids[0]).await.is_success());
    handle
        .send(RoomMessage::Disconnect { player_id: ids[1] })
        .await
        .unwrap();

    let view = get_view(&handle, ids[0]).await.unwrap();
    assert_eq!(view.phase, Phase::Ended);
    assert_eq!(view.player_count, 3);

    // The abort is announced to the remaining subscribers.
    let mut saw_abort = false;
    while let Ok(notification) = notifications.try_recv() {
        if let RoomNotification::Event(line) = notification {
            if line.contains("aborted") {
                saw_abort = true;
            }
        }
    }
    assert!(saw_abort);
}
