#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Harness, Sent, GROUP_CHAT};
use sports_games_bot::bot::events::ChatRef;
use sports_games_bot::bot::views::GAME_CODE_INSTRUCTION;
use sports_games_bot::database::models::KindOfSport;
use sports_games_bot::error::CommandError;
use sports_games_bot::services::sessions::SetupStep;
use sports_games_bot::utils::datetime::parse_start_time;

fn error_text(error: CommandError) -> String {
    format!("❌ {error}")
}

#[tokio::test]
async fn test_wizard_round_trip() {
    let h = Harness::new();
    let creator = h.register(10).await;

    let game = h
        .create_game(&creator, KindOfSport::Football, false, "Match\n5\n20:00 06.10.2017")
        .await;

    assert_eq!(game.creator_id, creator.id);
    assert_eq!(game.kind_of_sport, KindOfSport::Football);
    assert!(!game.is_public);
    assert_eq!(game.name, "Match");
    assert_eq!(game.players_per_team, 5);
    assert_eq!(game.start_time, Some(parse_start_time("20:00 06.10.2017").unwrap()));
    assert_eq!(game.chat_id, None);

    assert!(h.router.sessions().current(creator.telegram_id).is_none());
    let replies = h.notifier.messages_to(creator.telegram_id);
    assert_eq!(replies, vec![GAME_CODE_INSTRUCTION.to_string(), format!("/{}", game.id)]);
}

#[tokio::test]
async fn test_choose_kind_of_sport_twice_creates_one_game() {
    let h = Harness::new();
    let creator = h.register(10).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 1, "/choosesport").await;
    h.press(10, chat, 1, "/choosesport").await;

    assert_eq!(h.games_of(&creator).await.len(), 1);
    let session = h.router.sessions().current(10).unwrap();
    assert_eq!(session.game_id, Some(h.games_of(&creator).await[0].id));
    assert_eq!(session.step, SetupStep::AwaitingSport);

    let menu = h.notifier.last().unwrap();
    assert!(matches!(menu, Sent::Edit { message_id: 1, .. }));
    assert!(menu.keyboard().unwrap().find("/choosegameprivacy football").is_some());
}

#[tokio::test]
async fn test_concurrent_create_requests_create_one_game() {
    let h = Harness::new();
    let creator = h.register(10).await;
    let chat = ChatRef::private(10);

    tokio::join!(
        h.press(10, chat, 1, "/choosesport"),
        h.press(10, chat, 1, "/choosesport"),
        h.press(10, chat, 1, "/choosesport"),
    );

    assert_eq!(h.games_of(&creator).await.len(), 1);
}

#[tokio::test]
async fn test_free_text_without_session_is_rejected_without_writes() {
    let h = Harness::new();
    h.register(10).await;
    let writes = h.storage.writes();

    h.text(10, ChatRef::private(10), "Match\n5\n20:00 06.10.2017").await;

    assert_eq!(h.storage.writes(), writes);
    assert_eq!(h.notifier.last_text(), Some(error_text(CommandError::SessionNotActive)));
}

#[tokio::test]
async fn test_privacy_requires_sport_first() {
    let h = Harness::new();
    let creator = h.register(10).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 1, "/choosesport").await;
    h.press(10, chat, 1, "/newgame football|true").await;

    assert_eq!(h.notifier.last_text(), Some(error_text(CommandError::StepOutOfOrder)));
    let game = h.games_of(&creator).await.pop().unwrap();
    assert!(!game.is_public);
}

#[tokio::test]
async fn test_params_require_privacy_first() {
    let h = Harness::new();
    let creator = h.register(10).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 1, "/choosesport").await;
    h.press(10, chat, 1, "/choosegameprivacy futsal").await;
    h.text(10, chat, "Match\n5\n20:00 06.10.2017").await;

    assert_eq!(h.notifier.last_text(), Some(error_text(CommandError::StepOutOfOrder)));
    let game = h.games_of(&creator).await.pop().unwrap();
    assert_eq!(game.kind_of_sport, KindOfSport::Futsal);
    assert_eq!(game.name, "");
}

#[tokio::test]
async fn test_invalid_params_keep_session_open() {
    let h = Harness::new();
    let creator = h.register(10).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 1, "/choosesport").await;
    h.press(10, chat, 1, "/choosegameprivacy football").await;
    h.press(10, chat, 1, "/newgame football|false").await;

    h.text(10, chat, "Match\nzero\n20:00 06.10.2017").await;
    assert!(h.notifier.last_text().unwrap().starts_with("❌ Invalid data:"));
    assert_eq!(h.router.sessions().current(10).unwrap().step, SetupStep::AwaitingParams);

    h.text(10, chat, "Match\n0\n20:00 06.10.2017").await;
    assert!(h.notifier.last_text().unwrap().starts_with("❌ Invalid data:"));

    h.text(10, chat, "Match\n4\n20:00 06.10.2017").await;
    assert!(h.router.sessions().current(10).is_none());
    assert_eq!(h.games_of(&creator).await.pop().unwrap().players_per_team, 4);
}

#[tokio::test]
async fn test_unset_or_unknown_sport_is_bad_data() {
    let h = Harness::new();
    h.register(10).await;
    let chat = ChatRef::private(10);
    h.press(10, chat, 1, "/choosesport").await;

    h.press(10, chat, 1, "/choosegameprivacy unset").await;
    assert!(h.notifier.last_text().unwrap().starts_with("❌ Invalid data:"));

    h.press(10, chat, 1, "/choosegameprivacy curling").await;
    assert!(h.notifier.last_text().unwrap().starts_with("❌ Invalid data:"));
    assert_eq!(h.router.sessions().current(10).unwrap().step, SetupStep::AwaitingSport);
}

#[tokio::test]
async fn test_privacy_without_session() {
    let h = Harness::new();
    h.register(10).await;

    h.press(10, ChatRef::private(10), 1, "/choosegameprivacy football").await;

    assert_eq!(h.notifier.last_text(), Some(error_text(CommandError::SessionNotActive)));
}

#[tokio::test]
async fn test_edit_flow_reopens_session_for_creator() {
    let h = Harness::new();
    let creator = h.register(10).await;
    let game = h.create_game(&creator, KindOfSport::Football, false, "Match\n5\n20:00 06.10.2017").await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 7, &format!("/fixgame {}", game.id)).await;
    assert_eq!(h.router.sessions().current(10).unwrap().game_id, Some(game.id));

    h.press(10, chat, 7, "/choosegameprivacy futsal").await;
    h.press(10, chat, 7, "/newgame futsal|false").await;
    h.text(10, chat, "Renamed\n6\n21:30 07.10.2017").await;

    let edited = h.game(&game).await;
    assert_eq!(edited.kind_of_sport, KindOfSport::Futsal);
    assert_eq!(edited.name, "Renamed");
    assert_eq!(edited.players_per_team, 6);
    assert_eq!(h.games_of(&creator).await.len(), 1);
}

#[tokio::test]
async fn test_edit_by_someone_else_is_rejected() {
    let h = Harness::new();
    let creator = h.register(10).await;
    h.register(20).await;
    let game = h.create_game(&creator, KindOfSport::Football, false, "Match\n5\n20:00 06.10.2017").await;

    h.press(20, ChatRef::private(20), 3, &format!("/fixgame {}", game.id)).await;

    assert_eq!(h.notifier.last_text(), Some(error_text(CommandError::NotCreatorTryEdit)));
    assert!(h.router.sessions().current(20).is_none());
}

#[tokio::test]
async fn test_making_game_public_unbinds_chat() {
    let h = Harness::new();
    let creator = h.register(10).await;
    let game = h.create_game(&creator, KindOfSport::Football, false, "Match\n5\n20:00 06.10.2017").await;
    h.add_to_chat(&creator, &game, GROUP_CHAT).await;
    assert_eq!(h.game(&game).await.chat_id, Some(GROUP_CHAT));

    let chat = ChatRef::private(10);
    h.press(10, chat, 7, &format!("/fixgame {}", game.id)).await;
    h.press(10, chat, 7, "/choosegameprivacy football").await;
    h.press(10, chat, 7, "/newgame football|true").await;

    let edited = h.game(&game).await;
    assert!(edited.is_public);
    assert_eq!(edited.chat_id, None);
}

#[tokio::test]
async fn test_finish_closes_session_even_if_delete_fails() {
    let h = Harness::new();
    h.register(10).await;
    let chat = ChatRef::private(10);
    h.notifier.fail_deletes();

    h.press(10, chat, 1, "/choosesport").await;
    h.notifier.clear();
    h.press(10, chat, 1, "/finish").await;
    h.press(10, chat, 1, "/finish").await;

    assert!(h.router.sessions().current(10).is_none());
    assert!(h.notifier.sent().is_empty(), "finish must not report anything");
}

#[tokio::test]
async fn test_finish_deletes_wizard_message() {
    let h = Harness::new();
    h.register(10).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 5, "/choosesport").await;
    h.press(10, chat, 5, "/finish").await;

    assert_eq!(h.notifier.last(), Some(Sent::Delete { chat_id: 10, message_id: 5 }));
}

#[tokio::test]
async fn test_menu_closes_session() {
    let h = Harness::new();
    h.register(10).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 1, "/choosesport").await;
    h.text(10, chat, "/menu").await;

    assert!(h.router.sessions().current(10).is_none());
    assert_eq!(h.notifier.last_text().as_deref(), Some("Choose an action:"));
}
