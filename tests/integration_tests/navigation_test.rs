//! Navigation through the full session: resolve, take control, move, project

use pco_live::models::{NavigationState, VAR_PLAN_CURRENT_ITEM, VAR_PLAN_NEXT_ITEM};
use pco_live::session::{Action, PlanTarget, SessionStatus};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{
    live_descriptor, live_session, plans, service_types, session_for, LIVE_PATH, NEXT_PATH,
    PREVIOUS_PATH, TOGGLE_PATH,
};

const ME: &str = "https://api.planningcenteronline.com/people/me";

async fn mount_owned_by_me(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_descriptor(None)))
        .up_to_n_times(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_descriptor(Some(ME))))
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOGGLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_descriptor(Some(ME))))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_next_item_projects_navigation_state() {
    let mock_server = MockServer::start().await;
    mount_owned_by_me(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(NEXT_PATH))
        .and(query_param("include", "items,current_item_time"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(live_session(&["A", "B", "C"], Some(1))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let target = PlanTarget::from_parts(Some("1"), Some("p1")).unwrap();
    let outcome = session.perform(Action::Next, &target).await.unwrap();

    let expected = NavigationState {
        index: 1,
        length: 3,
        current_item_title: "B".to_string(),
        next_item_title: Some("C".to_string()),
    };
    assert_eq!(outcome.navigation, Some(expected.clone()));
    assert_eq!(session.navigation().await, Some(expected));
    assert_eq!(session.status().await, SessionStatus::Ok);
}

#[tokio::test]
async fn test_previous_to_last_item_has_no_next_title() {
    let mock_server = MockServer::start().await;
    mount_owned_by_me(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(PREVIOUS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(live_session(&["A", "B", "C"], Some(2))),
        )
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let target = PlanTarget::from_parts(Some("1"), Some("p1")).unwrap();
    let outcome = session.perform(Action::Previous, &target).await.unwrap();

    let state = outcome.navigation.unwrap();
    assert_eq!(state.index, 2);
    assert_eq!(state.next_item_title, None);

    let vars = state.variables();
    assert_eq!(vars[VAR_PLAN_CURRENT_ITEM], "C");
    assert_eq!(vars[VAR_PLAN_NEXT_ITEM], "");
}

#[tokio::test]
async fn test_plan_not_started_yields_empty_state() {
    let mock_server = MockServer::start().await;
    mount_owned_by_me(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(NEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_session(&["A", "B"], None)))
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let target = PlanTarget::from_parts(Some("1"), Some("p1")).unwrap();
    let outcome = session.perform(Action::Next, &target).await.unwrap();

    assert_eq!(outcome.navigation, None);
    assert_eq!(session.navigation().await, None);
}

#[tokio::test]
async fn test_plan_chosen_from_catalog() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service_types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_types(&[("1", "Sunday")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service_types/1/plans"))
        .and(query_param("filter", "future"))
        .and(query_param("per_page", "7"))
        .and(query_param("order", "sort_date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plans("1", &[("p1", "Jan 1")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_owned_by_me(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(NEXT_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(live_session(&["A", "B", "C"], Some(0))),
        )
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let catalog = session.load_catalog().await.unwrap();
    assert_eq!(catalog.plan_choices()[1].label, "Sunday - Jan 1 (p1)");

    let target = PlanTarget::from_parts(None, Some("p1")).unwrap();
    let outcome = session.perform(Action::Next, &target).await.unwrap();

    assert_eq!(outcome.service_type_id, "1");
    assert_eq!(outcome.navigation.unwrap().current_item_title, "A");
}

#[tokio::test]
async fn test_next_plan_in_service_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service_types/1/plans"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plans("1", &[("p1", "Jan 1")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_owned_by_me(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(NEXT_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(live_session(&["A", "B"], Some(1))),
        )
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let target = PlanTarget::from_parts(Some("1"), None).unwrap();
    let outcome = session.perform(Action::Next, &target).await.unwrap();

    assert_eq!(outcome.plan_id, "p1");
    assert_eq!(outcome.navigation.unwrap().length, 2);
}
