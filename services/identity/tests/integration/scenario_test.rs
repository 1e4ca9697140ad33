//! A member's whole path: invited, registered, signed in, inviting someone else.

use clubhouse_auth_types::session;
use clubhouse_domain::member::MemberRole;
use clubhouse_identity::domain::repository::CsrfStore;
use clubhouse_identity::error::IdentityError;
use clubhouse_identity::usecase::admission::{RegisterInput, RegisterUseCase};
use clubhouse_identity::usecase::invite::CreateInviteUseCase;
use clubhouse_identity::usecase::login::{
    RequestLoginCodeInput, RequestLoginCodeUseCase, VerifyLoginCodeInput, VerifyLoginCodeUseCase,
};
use clubhouse_identity::usecase::session::AuthenticateUseCase;

use crate::helpers::{
    ADMIN_PHONE, MockCommunity, RecordingNotifier, TEST_SECRET, login_policy, memory_stores,
    phone, test_admin,
};

#[tokio::test]
async fn should_carry_a_newcomer_from_invite_to_inviting_others() {
    let community = MockCommunity::new()
        .with_member(test_admin(ADMIN_PHONE, "Root"))
        .with_invite("MOON-742", ADMIN_PHONE);
    let (_clock, stores) = memory_stores();
    let notifier = RecordingNotifier::delivering();
    let register = RegisterUseCase {
        invites: community.clone(),
        notifier: notifier.clone(),
        admin_phones: vec![],
        max_members: 200,
        secret: TEST_SECRET.to_owned(),
        site_name: "The Clubhouse".to_owned(),
    };

    // Alice joins with the admin's code.
    let joined = register
        .execute(RegisterInput {
            invite_code: "moon-742".to_owned(),
            name: "Alice".to_owned(),
            phone: "555-123-4567".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(joined.member.phone, phone("5551234567"));

    // Later she signs in with a texted code.
    let request = RequestLoginCodeUseCase {
        members: community.clone(),
        limiter: stores.attempts.clone(),
        challenges: stores.challenges.clone(),
        notifier: notifier.clone(),
        policy: login_policy(),
    };
    let code = request
        .execute(RequestLoginCodeInput {
            phone: "+1 555 123 4567".to_owned(),
        })
        .await
        .unwrap()
        .code
        .unwrap();
    let verified = VerifyLoginCodeUseCase {
        challenges: stores.challenges.clone(),
        secret: TEST_SECRET.to_owned(),
    }
    .execute(VerifyLoginCodeInput {
        phone: "5551234567".to_owned(),
        code,
    })
    .await
    .unwrap();

    let identity = session::read(&verified.session_token, TEST_SECRET).expect("valid session");
    assert_eq!(identity, phone("5551234567"));

    // With the session and her CSRF token she creates an invite of her own.
    let auth = AuthenticateUseCase {
        members: community.clone(),
        csrf: stores.csrf.clone(),
    };
    let csrf = stores.csrf.token_for(&identity).await.unwrap();
    let alice = auth.authorize_write(&identity, Some(&csrf)).await.unwrap();
    let invite = CreateInviteUseCase {
        invites: community.clone(),
    }
    .execute(&alice)
    .await
    .unwrap();
    assert_eq!(invite.created_by, alice.phone);

    // Bob redeems it once; Carol cannot reuse it.
    let bob = register
        .execute(RegisterInput {
            invite_code: invite.code.clone(),
            name: "Bob".to_owned(),
            phone: "5552223333".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(bob.member.role(), MemberRole::Member);

    let carol = register
        .execute(RegisterInput {
            invite_code: invite.code.clone(),
            name: "Carol".to_owned(),
            phone: "5554445555".to_owned(),
        })
        .await;
    assert!(
        matches!(carol, Err(IdentityError::InvalidInviteCode)),
        "expected InvalidInviteCode, got {carol:?}"
    );

    assert_eq!(community.member_count(), 3);
    assert_eq!(
        community.invite(&invite.code).unwrap().used_by,
        Some(phone("5552223333"))
    );
}
