use super::*;

const ALL_ROLES: [Role; 3] = [Role::Dean, Role::Faculty, Role::Student];

fn destinations() -> Vec<Destination> {
    vec![
        Destination::Dashboard,
        Destination::FacultyManagement,
        Destination::Create,
        Destination::MyReports,
        Destination::Detail(TicketId(7)),
    ]
}

#[test]
fn unreachable_views_leave_state_untouched() {
    for role in ALL_ROLES {
        for destination in destinations() {
            let mut router = ViewRouter::new();
            router
                .navigate(Some(role), Destination::Create)
                .expect("create is open to everyone");
            let before = router.state();

            let ticket = router.navigate(Some(role), destination);
            if destination.view().is_reachable_by(role) {
                assert!(ticket.is_some(), "{role} should reach {}", destination.view());
                assert_eq!(router.state().current, destination.view());
            } else {
                assert!(ticket.is_none(), "{role} must not reach {}", destination.view());
                assert_eq!(router.state(), before);
            }
        }
    }
}

#[test]
fn reachability_matches_role_table() {
    assert!(!View::Dashboard.is_reachable_by(Role::Student));
    assert!(!View::FacultyManagement.is_reachable_by(Role::Student));
    assert!(!View::FacultyManagement.is_reachable_by(Role::Faculty));
    assert!(View::FacultyManagement.is_reachable_by(Role::Dean));
    assert!(View::Dashboard.is_reachable_by(Role::Faculty));
    assert!(View::MyReports.is_reachable_by(Role::Student));
    for role in ALL_ROLES {
        assert!(!View::Login.is_reachable_by(role));
    }
}

#[test]
fn navigation_without_session_is_ignored() {
    let mut router = ViewRouter::new();
    assert!(router.navigate(None, Destination::Create).is_none());
    assert_eq!(router.state(), ViewState::default());
}

#[test]
fn detail_records_the_selected_ticket() {
    let mut router = ViewRouter::new();
    let ticket = router
        .navigate(Some(Role::Student), Destination::Detail(TicketId(12)))
        .expect("detail");
    assert_eq!(ticket.view(), View::Detail);
    assert_eq!(ticket.selected_ticket(), Some(TicketId(12)));
    assert_eq!(router.state().selected_ticket, Some(TicketId(12)));
}

#[test]
fn newer_navigation_makes_older_tickets_stale() {
    let mut router = ViewRouter::new();
    let first = router
        .navigate(Some(Role::Dean), Destination::Detail(TicketId(1)))
        .expect("detail");
    assert!(router.is_current(&first));

    let second = router
        .navigate(Some(Role::Dean), Destination::Dashboard)
        .expect("dashboard");
    assert!(!router.is_current(&first));
    assert!(router.is_current(&second));

    // Same view again still supersedes the earlier load.
    let third = router
        .navigate(Some(Role::Dean), Destination::Dashboard)
        .expect("dashboard");
    assert!(!router.is_current(&second));
    assert!(third.generation() > second.generation());
}

#[test]
fn reload_detail_only_while_detail_is_showing() {
    let mut router = ViewRouter::new();
    router
        .navigate(Some(Role::Faculty), Destination::Detail(TicketId(3)))
        .expect("detail");
    assert!(router.reload_detail(TicketId(4)).is_none());
    let reload = router.reload_detail(TicketId(3)).expect("reload");
    assert!(router.is_current(&reload));

    router
        .navigate(Some(Role::Faculty), Destination::Dashboard)
        .expect("dashboard");
    assert!(router.reload_detail(TicketId(3)).is_none());
}

#[test]
fn reset_returns_to_login() {
    let mut router = ViewRouter::new();
    let stale = router
        .navigate(Some(Role::Dean), Destination::Detail(TicketId(5)))
        .expect("detail");
    router.reset();
    assert_eq!(router.state(), ViewState::default());
    assert!(!router.is_current(&stale));
}

#[test]
fn menu_lists_reachable_views_only() {
    assert_eq!(menu(Role::Student), vec![View::Create, View::MyReports]);
    assert_eq!(menu(Role::Faculty), vec![View::Dashboard, View::Create]);
    assert_eq!(
        menu(Role::Dean),
        vec![View::Dashboard, View::FacultyManagement, View::Create]
    );
    for role in ALL_ROLES {
        assert!(menu(role).iter().all(|view| view.is_reachable_by(role)));
    }
}

#[test]
fn parameterless_destinations() {
    assert_eq!(Destination::for_view(View::MyReports), Some(Destination::MyReports));
    assert_eq!(Destination::for_view(View::Detail), None);
    assert_eq!(Destination::for_view(View::Login), None);
}
