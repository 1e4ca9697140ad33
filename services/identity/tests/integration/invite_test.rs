use clubhouse_domain::invite::is_well_formed;
use clubhouse_identity::error::IdentityError;
use clubhouse_identity::usecase::invite::{
    CreateInviteUseCase, SendInviteInput, SendInviteUseCase,
};

use crate::helpers::{MockCommunity, RecordingNotifier, phone, test_member};

const INVITER_PHONE: &str = "5551234567";
const FRIEND_PHONE: &str = "5558889999";

fn send_usecase(
    community: &MockCommunity,
    notifier: &RecordingNotifier,
    site_url: Option<&str>,
) -> SendInviteUseCase<MockCommunity, MockCommunity, RecordingNotifier> {
    SendInviteUseCase {
        members: community.clone(),
        invites: community.clone(),
        notifier: notifier.clone(),
        site_name: "The Clubhouse".to_owned(),
        site_url: site_url.map(str::to_owned),
    }
}

fn to(raw_phone: &str) -> SendInviteInput {
    SendInviteInput {
        phone: raw_phone.to_owned(),
    }
}

#[tokio::test]
async fn should_create_unused_invite_owned_by_creator() {
    let inviter = test_member(INVITER_PHONE, "Alice");
    let community = MockCommunity::new().with_member(inviter.clone());

    let invite = CreateInviteUseCase {
        invites: community.clone(),
    }
    .execute(&inviter)
    .await
    .unwrap();

    assert!(is_well_formed(&invite.code), "malformed code {}", invite.code);
    assert_eq!(invite.created_by, phone(INVITER_PHONE));
    assert!(!invite.is_redeemed());
    assert_eq!(community.invite(&invite.code), Some(invite));
}

#[tokio::test]
async fn should_create_distinct_codes() {
    let inviter = test_member(INVITER_PHONE, "Alice");
    let community = MockCommunity::new().with_member(inviter.clone());
    let usecase = CreateInviteUseCase {
        invites: community.clone(),
    };

    for _ in 0..20 {
        usecase.execute(&inviter).await.unwrap();
    }

    assert_eq!(community.invite_count(), 20);
}

#[tokio::test]
async fn should_text_join_link_when_site_url_is_set() {
    let inviter = test_member(INVITER_PHONE, "Alice");
    let community = MockCommunity::new().with_member(inviter.clone());
    let notifier = RecordingNotifier::delivering();

    let out = send_usecase(&community, &notifier, Some("https://club.example"))
        .execute(&inviter, to("(555) 888-9999"))
        .await
        .unwrap();

    assert!(out.delivered);
    assert_eq!(out.recipient, phone(FRIEND_PHONE));
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, phone(FRIEND_PHONE));
    assert!(messages[0].1.starts_with("Alice invited you to The Clubhouse!"));
    assert!(
        messages[0]
            .1
            .contains(&format!("https://club.example/join/{}", out.invite.code))
    );
}

#[tokio::test]
async fn should_text_bare_code_without_site_url() {
    let inviter = test_member(INVITER_PHONE, "Alice");
    let community = MockCommunity::new().with_member(inviter.clone());
    let notifier = RecordingNotifier::delivering();

    let out = send_usecase(&community, &notifier, None)
        .execute(&inviter, to(FRIEND_PHONE))
        .await
        .unwrap();

    let messages = notifier.messages();
    assert!(
        messages[0]
            .1
            .contains(&format!("Your invite code: {}", out.invite.code))
    );
    assert!(!messages[0].1.contains("/join/"));
}

#[tokio::test]
async fn should_keep_invite_when_delivery_fails() {
    let inviter = test_member(INVITER_PHONE, "Alice");
    let community = MockCommunity::new().with_member(inviter.clone());
    let notifier = RecordingNotifier::failing();

    let out = send_usecase(&community, &notifier, None)
        .execute(&inviter, to(FRIEND_PHONE))
        .await
        .unwrap();

    assert!(!out.delivered);
    let stored = community.invite(&out.invite.code).expect("invite stored");
    assert!(!stored.is_redeemed());
}

#[tokio::test]
async fn should_not_invite_an_existing_member() {
    let inviter = test_member(INVITER_PHONE, "Alice");
    let community = MockCommunity::new()
        .with_member(inviter.clone())
        .with_member(test_member(FRIEND_PHONE, "Bob"));
    let notifier = RecordingNotifier::delivering();

    let result = send_usecase(&community, &notifier, None)
        .execute(&inviter, to(FRIEND_PHONE))
        .await;

    assert!(
        matches!(result, Err(IdentityError::AlreadyMember)),
        "expected AlreadyMember, got {result:?}"
    );
    assert_eq!(community.invite_count(), 0);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn should_reject_blank_recipient() {
    let inviter = test_member(INVITER_PHONE, "Alice");
    let community = MockCommunity::new().with_member(inviter.clone());
    let notifier = RecordingNotifier::delivering();

    let result = send_usecase(&community, &notifier, None)
        .execute(&inviter, to(""))
        .await;

    assert!(
        matches!(result, Err(IdentityError::InvalidInput)),
        "expected InvalidInput, got {result:?}"
    );
}
