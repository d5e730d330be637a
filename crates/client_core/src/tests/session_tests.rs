use super::*;
use crate::test_support::{user, FakeApi};

#[test]
fn display_name_falls_back_to_username() {
    let mut anonymous = user(4, Role::Student);
    anonymous.full_name = "   ".to_string();
    let session = Session::from(anonymous);
    assert_eq!(session.display_name, "student4");

    let session = Session::from(user(1, Role::Dean));
    assert_eq!(session.display_name, "Test dean");
}

#[test]
fn landing_depends_on_role() {
    assert_eq!(landing_for(Role::Student), Destination::Create);
    assert_eq!(landing_for(Role::Faculty), Destination::Dashboard);
    assert_eq!(landing_for(Role::Dean), Destination::Dashboard);
}

#[test]
fn establish_replaces_and_clear_returns_previous() {
    let mut store = SessionStore::default();
    assert!(!store.is_authenticated());
    assert_eq!(store.role(), None);

    store.establish(user(2, Role::Faculty));
    let session = store.establish(user(1, Role::Dean));
    assert_eq!(session.user_id, UserId(1));
    assert_eq!(store.role(), Some(Role::Dean));

    let previous = store.clear().expect("previous session");
    assert_eq!(previous.role, Role::Dean);
    assert!(store.current().is_none());
    assert!(store.clear().is_none());
}

#[test]
fn blank_credentials_never_become_a_request() {
    for (username, password) in [("", "pw"), ("dean", ""), ("  ", "pw"), ("dean", "   ")] {
        let err = login_request(username, password).expect_err("blank must fail");
        assert_eq!(err.reason, ErrorReason::Validation);
        assert_eq!(
            login_failure_message(&err),
            "Please enter both username and password"
        );
    }

    let request = login_request("  dean ", " dean123 ").expect("request");
    assert_eq!(request.username, "dean");
    assert_eq!(request.password, " dean123 ");
}

#[test]
fn failure_messages_follow_reason() {
    assert_eq!(
        login_failure_message(&ApiError::new(ErrorReason::Unauthorized, "nope")),
        "Invalid credentials. Please try again."
    );
    assert_eq!(
        login_failure_message(&ApiError::network("refused")),
        "Login failed. Please try again."
    );
    assert_eq!(
        login_failure_message(&ApiError::server("boom")),
        "Login failed. Please try again."
    );
}

#[tokio::test]
async fn check_session_collapses_failures_to_none() {
    let api = FakeApi::signed_in(Role::Faculty);
    let found = check_session(api.as_ref()).await.expect("session");
    assert_eq!(found.role, Role::Faculty);

    api.fail("session_check", ApiError::network("connection refused"));
    assert!(check_session(api.as_ref()).await.is_none());

    let anonymous = FakeApi::new();
    assert!(check_session(anonymous.as_ref()).await.is_none());
}

#[tokio::test]
async fn logout_is_best_effort() {
    let api = FakeApi::signed_in(Role::Dean);
    api.fail("logout", ApiError::server("store unavailable"));
    logout(api.as_ref()).await;
    assert_eq!(api.count("logout"), 1);
}

#[tokio::test]
async fn login_passes_server_rejection_through() {
    let api = FakeApi::new();
    let request = login_request("dean", "wrong").expect("request");
    let err = login(api.as_ref(), &request).await.expect_err("rejected");
    assert!(err.is_unauthorized());
    assert_eq!(api.logins.lock().expect("logins lock").len(), 1);
}
