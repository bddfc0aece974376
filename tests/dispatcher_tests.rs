#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Harness, Sent, GROUP_CHAT};
use sports_games_bot::bot::events::ChatRef;
use sports_games_bot::bot::views::GAME_CODE_INSTRUCTION;
use sports_games_bot::database::models::{KindOfSport, Player};
use sports_games_bot::database::repository::{find_player, Repository};
use sports_games_bot::error::CommandError;

fn not_registered() -> String {
    format!("❌ {}", CommandError::NotRegistered)
}

async fn create_games(h: &Harness, creator: &Player, count: usize) {
    for n in 1..=count {
        h.create_game(creator, KindOfSport::Football, false, &format!("G{n}\n5\n20:00 06.10.2030")).await;
    }
}

#[tokio::test]
async fn test_start_offers_sign_in() {
    let h = Harness::new();

    h.text(10, ChatRef::private(10), "/start").await;

    let reply = h.notifier.last().unwrap();
    assert_eq!(reply.text(), Some("You need to register before using the bot."));
    assert!(reply.keyboard().unwrap().find("/signin").is_some());
}

#[tokio::test]
async fn test_start_in_group_points_to_private_chat() {
    let h = Harness::new();

    h.text(10, ChatRef::group(GROUP_CHAT), "/start").await;

    let reply = h.notifier.last().unwrap();
    assert!(matches!(reply, Sent::Message { chat_id: GROUP_CHAT, .. }));
    assert!(reply.text().unwrap().contains("/start"));
    assert!(reply.keyboard().is_none());
}

#[tokio::test]
async fn test_sign_in_registers_player() {
    let h = Harness::new();
    let chat = ChatRef::private(10);
    h.text(10, chat, "/start").await;
    let prompt_id = h.notifier.last_message_id(10).unwrap();

    h.press(10, chat, prompt_id, "/signin").await;

    let player = find_player(h.storage.as_ref(), 10).await.unwrap().unwrap();
    assert_eq!(player.name, "Player10");
    assert_eq!(player.nickname.as_deref(), Some("player10"));
    assert_eq!(player.language_code.as_deref(), Some("en"));
    let reply = h.notifier.last().unwrap();
    assert!(matches!(reply, Sent::Edit { chat_id: 10, message_id, .. } if message_id == prompt_id));
    assert!(reply.text().unwrap().starts_with("Player10, you are registered."));

    // Signing in twice keeps a single player
    h.press(10, chat, prompt_id, "/signin").await;
    assert_eq!(h.storage.players.len().await, 1);

    h.text(10, chat, "/START").await;
    assert!(h.notifier.last_text().unwrap().starts_with("Player10, you are already registered."));
}

#[tokio::test]
async fn test_sign_in_from_group_is_refused() {
    let h = Harness::new();

    h.press(10, ChatRef::group(GROUP_CHAT), 5, "/signin").await;

    assert!(h.storage.players.is_empty().await);
    assert_eq!(h.notifier.last_text(), Some(not_registered()));
}

#[tokio::test]
async fn test_unregistered_users_are_turned_away() {
    let h = Harness::new();
    let chat = ChatRef::private(10);

    h.text(10, chat, "/menu").await;
    assert_eq!(h.notifier.last_text(), Some(not_registered()));

    h.press(10, chat, 1, "/choosesport").await;
    assert_eq!(h.notifier.last_text(), Some(not_registered()));

    h.text(10, chat, "Match\n5\n20:00 06.10.2017").await;
    assert_eq!(h.notifier.last_text(), Some(not_registered()));

    assert_eq!(h.storage.writes(), 0);
}

#[tokio::test]
async fn test_group_chatter_is_ignored() {
    let h = Harness::new();
    h.register(10).await;

    h.text(10, ChatRef::group(GROUP_CHAT), "who is playing tonight?").await;
    h.text(99, ChatRef::group(GROUP_CHAT), "me").await;

    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_faq_lists_commands() {
    let h = Harness::new();
    h.register(10).await;

    h.text(10, ChatRef::private(10), "/faq").await;
    let faq = h.notifier.last_text().unwrap();
    assert!(faq.contains("/menu"));
    assert!(faq.contains("/guide"));

    h.text(10, ChatRef::private(10), "/guide").await;
    assert_eq!(h.notifier.last_text(), Some(faq));
}

#[tokio::test]
async fn test_unknown_callback_is_bad_data() {
    let h = Harness::new();
    h.register(10).await;

    h.press(10, ChatRef::private(10), 1, "/bogus 1").await;

    assert_eq!(h.notifier.last_text().as_deref(), Some("❌ Invalid data: unknown action '/bogus'"));
}

#[tokio::test]
async fn test_my_games_navigation() {
    let h = Harness::new();
    let creator = h.register(10).await;
    create_games(&h, &creator, 3).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 50, "/mygames").await;
    let card = h.notifier.last().unwrap();
    assert!(card.text().unwrap().starts_with("1.\nName: G1"));
    let keyboard = card.keyboard().unwrap();
    assert!(keyboard.find("/tofirst").is_none());
    assert!(keyboard.find("/next 2").is_some());
    assert!(keyboard.find("/tolast").is_some());

    h.press(10, chat, 50, "/next 2").await;
    let card = h.notifier.last().unwrap();
    assert!(card.text().unwrap().starts_with("2.\nName: G2"));
    let keyboard = card.keyboard().unwrap();
    assert!(keyboard.find("/previous 1").is_some());
    assert!(keyboard.find("/next 3").is_some());

    h.press(10, chat, 50, "/tolast").await;
    let card = h.notifier.last().unwrap();
    assert!(card.text().unwrap().starts_with("3.\nName: G3"));
    assert!(card.keyboard().unwrap().find("/tolast").is_none());

    h.press(10, chat, 50, "/tofirst").await;
    assert!(h.notifier.last_text().unwrap().starts_with("1.\nName: G1"));
}

#[tokio::test]
async fn test_my_games_past_the_end_shows_last_game() {
    let h = Harness::new();
    let creator = h.register(10).await;
    create_games(&h, &creator, 2).await;

    h.press(10, ChatRef::private(10), 50, "/next 7").await;

    assert!(h.notifier.last_text().unwrap().starts_with("2.\nName: G2"));
}

#[tokio::test]
async fn test_my_games_when_there_are_none() {
    let h = Harness::new();
    h.register(10).await;

    h.press(10, ChatRef::private(10), 50, "/mygames").await;

    assert_eq!(h.notifier.last_text().as_deref(), Some("You have no games yet."));
}

#[tokio::test]
async fn test_game_code_button_resends_code() {
    let h = Harness::new();
    let creator = h.register(10).await;
    create_games(&h, &creator, 1).await;
    let game = h.games_of(&creator).await.pop().unwrap();
    h.notifier.clear();

    h.press(10, ChatRef::private(10), 50, &format!("/gamecode {}", game.id)).await;

    assert_eq!(h.notifier.messages_to(10), vec![GAME_CODE_INSTRUCTION.to_string(), game.code()]);
}

#[tokio::test]
async fn test_time_zone_selection() {
    let h = Harness::new();
    let player = h.register(10).await;
    let chat = ChatRef::private(10);

    h.press(10, chat, 8, "/timezone").await;
    let menu = h.notifier.last().unwrap();
    assert!(menu.text().unwrap().starts_with("Your time zone: +3 Moscow"));
    assert!(menu.keyboard().unwrap().find("/settimezone 5").is_some());

    h.press(10, chat, 8, "/settimezone 5").await;
    assert!(h.notifier.last_text().unwrap().starts_with("Time zone set to +5 Yekaterinburg, Ufa."));
    let stored = h.storage.players.get(player.id).await.unwrap().unwrap();
    assert_eq!(stored.utc_offset, Some(5));

    h.press(10, chat, 8, "/settimezone 4").await;
    assert!(h.notifier.last_text().unwrap().starts_with("❌ Invalid data:"));
    let stored = h.storage.players.get(player.id).await.unwrap().unwrap();
    assert_eq!(stored.utc_offset, Some(5));
}

#[tokio::test]
async fn test_transport_failure_gets_generic_reply() {
    let h = Harness::new();
    h.register(10).await;
    h.notifier.fail_edits();

    h.press(10, ChatRef::private(10), 8, "/menu").await;

    assert_eq!(
        h.notifier.last_text().as_deref(),
        Some("❌ Command execution failed. Please try again later.")
    );
}
