use clubhouse_identity::domain::repository::CsrfStore;
use clubhouse_identity::error::IdentityError;
use clubhouse_identity::infra::memory::{MemoryCsrfStore, MemoryStores};
use clubhouse_identity::usecase::session::AuthenticateUseCase;

use crate::helpers::{MockCommunity, memory_stores, phone, test_member};

const MEMBER_PHONE: &str = "5551234567";

fn authenticate(
    community: &MockCommunity,
    stores: &MemoryStores,
) -> AuthenticateUseCase<MockCommunity, MemoryCsrfStore> {
    AuthenticateUseCase {
        members: community.clone(),
        csrf: stores.csrf.clone(),
    }
}

#[tokio::test]
async fn should_resolve_current_member() {
    let community = MockCommunity::new().with_member(test_member(MEMBER_PHONE, "Alice"));
    let (_clock, stores) = memory_stores();

    let member = authenticate(&community, &stores)
        .current_member(&phone(MEMBER_PHONE))
        .await
        .unwrap();

    assert_eq!(member.name, "Alice");
}

#[tokio::test]
async fn should_treat_vanished_member_as_signed_out() {
    let community = MockCommunity::new();
    let (_clock, stores) = memory_stores();

    let result = authenticate(&community, &stores)
        .current_member(&phone(MEMBER_PHONE))
        .await;

    assert!(
        matches!(result, Err(IdentityError::Unauthenticated)),
        "expected Unauthenticated, got {result:?}"
    );
}

#[tokio::test]
async fn should_authorize_write_with_matching_csrf_token() {
    let community = MockCommunity::new().with_member(test_member(MEMBER_PHONE, "Alice"));
    let (_clock, stores) = memory_stores();
    let token = stores.csrf.token_for(&phone(MEMBER_PHONE)).await.unwrap();

    let member = authenticate(&community, &stores)
        .authorize_write(&phone(MEMBER_PHONE), Some(&token))
        .await
        .unwrap();

    assert_eq!(member.phone, phone(MEMBER_PHONE));
}

#[tokio::test]
async fn should_reject_write_without_or_with_wrong_csrf_token() {
    let community = MockCommunity::new().with_member(test_member(MEMBER_PHONE, "Alice"));
    let (_clock, stores) = memory_stores();
    stores.csrf.token_for(&phone(MEMBER_PHONE)).await.unwrap();
    let usecase = authenticate(&community, &stores);

    let missing = usecase.authorize_write(&phone(MEMBER_PHONE), None).await;
    assert!(
        matches!(missing, Err(IdentityError::InvalidCsrfToken)),
        "expected InvalidCsrfToken, got {missing:?}"
    );

    let wrong = usecase
        .authorize_write(&phone(MEMBER_PHONE), Some("not-the-token"))
        .await;
    assert!(
        matches!(wrong, Err(IdentityError::InvalidCsrfToken)),
        "expected InvalidCsrfToken, got {wrong:?}"
    );
}

#[tokio::test]
async fn should_not_accept_another_members_token() {
    let community = MockCommunity::new()
        .with_member(test_member(MEMBER_PHONE, "Alice"))
        .with_member(test_member("5559876543", "Bob"));
    let (_clock, stores) = memory_stores();
    let bobs = stores.csrf.token_for(&phone("5559876543")).await.unwrap();
    stores.csrf.token_for(&phone(MEMBER_PHONE)).await.unwrap();

    let result = authenticate(&community, &stores)
        .authorize_write(&phone(MEMBER_PHONE), Some(&bobs))
        .await;

    assert!(
        matches!(result, Err(IdentityError::InvalidCsrfToken)),
        "expected InvalidCsrfToken, got {result:?}"
    );
}
