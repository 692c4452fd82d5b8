//! End-to-end reconciliation tests using wiremock.
//!
//! One mock server plays both Keystone (password auth + catalog) and the
//! Monasca API, so every scenario runs through the full pipeline:
//! authenticate, discover, list, and at most one mutating call.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use monasca_reconcile::module;
use monasca_reconcile::params::{AlarmSpec, Connection, NotificationSpec, Severity, State};

const TOKEN: &str = "sess-token-1";

/// Password-mode connection pointing at the mock server, discovery enabled.
fn password_connection(server: &MockServer) -> Connection {
    Connection {
        api_version: "2_0".to_string(),
        keystone_url: format!("{}/v3", server.uri()),
        keystone_project: "monitoring".to_string(),
        keystone_user: Some("mon".to_string()),
        keystone_password: Some("secret".to_string()),
        keystone_token: None,
        monasca_api_url: None,
        user_domain_id: "default".to_string(),
        project_domain_id: "default".to_string(),
        monasca_endpoint_region: None,
        monasca_endpoint_interface: None,
    }
}

/// Mount the Keystone half: password exchange and a catalog whose monitoring
/// endpoint points back at the mock server under /monasca.
async fn mount_keystone(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("X-Subject-Token", TOKEN)
                .set_body_json(json!({"token": {"project": {"name": "monitoring"}}})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/auth/catalog"))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "catalog": [
                {
                    "type": "monitoring",
                    "endpoints": [
                        {
                            "interface": "admin",
                            "region": "RegionOne",
                            "url": format!("{}/monasca", server.uri())
                        }
                    ]
                }
            ]
        })))
        .mount(server)
        .await;
}

fn alarm_spec(state: State) -> AlarmSpec {
    AlarmSpec {
        name: "High CPU usage".to_string(),
        state,
        expression: Some("avg(cpu.idle_perc) < 10 times 3".to_string()),
        description: None,
        match_by: vec!["hostname".to_string()],
        severity: Severity::Low,
        alarm_actions: vec![],
        ok_actions: vec![],
        undetermined_actions: vec![],
    }
}

fn existing_alarm() -> serde_json::Value {
    json!({
        "id": "ad-42",
        "name": "High CPU usage",
        "expression": "avg(cpu.idle_perc) < 10 times 3",
        "match_by": ["hostname"],
        "severity": "LOW",
        "alarm_actions": [],
        "ok_actions": [],
        "undetermined_actions": []
    })
}

mod alarm_definitions {
    use super::*;

    /// Scenario A: desired present against an empty collection creates.
    #[tokio::test]
    async fn create_when_absent() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ResponseTemplate::new(201).set_body_json(existing_alarm()))
            .expect(1)
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Present), false)
                .await;

        assert!(!result.failed(), "unexpected error: {:?}", result.error);
        assert!(result.changed);
        assert_eq!(result.resource_id.as_deref(), Some("ad-42"));
        assert_eq!(
            result.monasca_api_url.as_deref(),
            Some(format!("{}/monasca/v2.0", server.uri()).as_str())
        );
    }

    /// Scenario B: the same desired state applied again is a no-op.
    #[tokio::test]
    async fn unchanged_when_identical() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"elements": [existing_alarm()]})),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/monasca/v2.0/alarm-definitions/ad-42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Present), false)
                .await;

        assert!(!result.failed());
        assert!(!result.changed);
        assert_eq!(result.resource_id.as_deref(), Some("ad-42"));
    }

    /// Changing only fields outside the comparison set must not update.
    #[tokio::test]
    async fn excluded_fields_do_not_update() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"elements": [existing_alarm()]})),
            )
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/monasca/v2.0/alarm-definitions/ad-42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut spec = alarm_spec(State::Present);
        spec.description = Some("completely new description".to_string());
        spec.match_by = vec!["service".to_string()];
        spec.severity = Severity::Critical;

        let result =
            module::run_alarm_definition(&password_connection(&server), &spec, false).await;

        assert!(!result.failed());
        assert!(!result.changed);
    }

    /// Changing the expression forces a PATCH.
    #[tokio::test]
    async fn expression_change_updates() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"elements": [existing_alarm()]})),
            )
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/monasca/v2.0/alarm-definitions/ad-42"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ad-42"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut spec = alarm_spec(State::Present);
        spec.expression = Some("avg(cpu.idle_perc) < 5 times 3".to_string());

        let result =
            module::run_alarm_definition(&password_connection(&server), &spec, false).await;

        assert!(!result.failed());
        assert!(result.changed);
        assert_eq!(result.resource_id.as_deref(), Some("ad-42"));
    }

    /// Desired absent deletes, and only a 204 counts as success.
    #[tokio::test]
    async fn absent_deletes_on_204() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"elements": [existing_alarm()]})),
            )
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/monasca/v2.0/alarm-definitions/ad-42"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Absent), false)
                .await;

        assert!(!result.failed());
        assert!(result.changed);
        assert!(result.resource_id.is_none());
    }

    #[tokio::test]
    async fn non_204_delete_is_an_error() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"elements": [existing_alarm()]})),
            )
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/monasca/v2.0/alarm-definitions/ad-42"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Absent), false)
                .await;

        assert!(result.failed());
        assert!(!result.changed);
        assert!(result.error.as_deref().unwrap().contains("500"));
    }

    /// A create response without an id surfaces the body verbatim.
    #[tokio::test]
    async fn create_without_id_is_an_error() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"description": "expression is invalid"})),
            )
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Present), false)
                .await;

        assert!(result.failed());
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("expression is invalid"));
    }
}

mod notification_methods {
    use super::*;

    fn notification_spec(state: State) -> NotificationSpec {
        NotificationSpec {
            name: "Email Root".to_string(),
            state,
            method_type: "EMAIL".to_string(),
            address: "root@localhost".to_string(),
        }
    }

    /// Scenario C: desired absent against a collection without that name is
    /// a no-op and no delete is issued.
    #[tokio::test]
    async fn absent_and_missing_is_unchanged() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/notification-methods"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {"id": "n-1", "name": "Pager Ops", "type": "PAGERDUTY", "address": "ops-key"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/monasca/v2.0/notification-methods/n-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let result = module::run_notification_method(
            &password_connection(&server),
            &notification_spec(State::Absent),
            false,
        )
        .await;

        assert!(!result.failed());
        assert!(!result.changed);
        assert!(result.resource_id.is_none());
    }

    /// A diverged address updates via PUT.
    #[tokio::test]
    async fn address_change_updates() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/notification-methods"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {"id": "n-7", "name": "Email Root", "type": "EMAIL", "address": "old@localhost"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/monasca/v2.0/notification-methods/n-7"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "n-7", "name": "Email Root", "type": "EMAIL", "address": "root@localhost"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = module::run_notification_method(
            &password_connection(&server),
            &notification_spec(State::Present),
            false,
        )
        .await;

        assert!(!result.failed());
        assert!(result.changed);
        assert_eq!(result.resource_id.as_deref(), Some("n-7"));
    }

    /// Token mode with an explicit API URL never touches Keystone.
    #[tokio::test]
    async fn token_mode_skips_keystone() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/auth/tokens"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/notification-methods"))
            .and(header("X-Auth-Token", "pre-issued"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/monasca/v2.0/notification-methods"))
            .and(header("X-Auth-Token", "pre-issued"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "n-1", "name": "Email Root", "type": "EMAIL", "address": "root@localhost"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let conn = Connection {
            keystone_user: None,
            keystone_password: None,
            keystone_token: Some("pre-issued".to_string()),
            monasca_api_url: Some(format!("{}/monasca/v2.0", server.uri())),
            ..password_connection(&server)
        };

        let result =
            module::run_notification_method(&conn, &notification_spec(State::Present), false).await;

        assert!(!result.failed(), "unexpected error: {:?}", result.error);
        assert!(result.changed);
        assert_eq!(result.resource_id.as_deref(), Some("n-1"));
    }
}

mod check_mode {
    use super::*;

    /// Check mode reports the would-be outcome with zero mutating calls,
    /// whichever branch is taken.
    #[tokio::test]
    async fn no_mutation_on_any_branch() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"elements": [existing_alarm()]})),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/monasca/v2.0/alarm-definitions/ad-42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/monasca/v2.0/alarm-definitions/ad-42"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        // Would update: expression diverged.
        let mut spec = alarm_spec(State::Present);
        spec.expression = Some("avg(cpu.idle_perc) < 1".to_string());
        let result =
            module::run_alarm_definition(&password_connection(&server), &spec, true).await;
        assert!(!result.failed());
        assert!(result.changed);
        assert_eq!(result.resource_id.as_deref(), Some("ad-42"));

        // Would delete.
        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Absent), true)
                .await;
        assert!(!result.failed());
        assert!(result.changed);
    }

    /// Check-mode create reports changed with no id.
    #[tokio::test]
    async fn create_reports_without_id() {
        let server = MockServer::start().await;
        mount_keystone(&server).await;

        Mock::given(method("GET"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/monasca/v2.0/alarm-definitions"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Present), true)
                .await;

        assert!(!result.failed());
        assert!(result.changed);
        assert!(result.resource_id.is_none());
    }
}

mod failures {
    use super::*;

    /// Rejected credentials surface as a terminal auth error.
    #[tokio::test]
    async fn rejected_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/auth/tokens"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": {"message": "invalid credentials"}})),
            )
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Present), false)
                .await;

        assert!(result.failed());
        assert!(result.error.as_deref().unwrap().contains("authentication"));
        assert!(result.monasca_api_url.is_none());
    }

    /// A catalog with no matching monitoring endpoint is a discovery error.
    #[tokio::test]
    async fn no_matching_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/auth/tokens"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("X-Subject-Token", TOKEN)
                    .set_body_json(json!({"token": {}})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/auth/catalog"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "catalog": [
                    {
                        "type": "monitoring",
                        "endpoints": [
                            {"interface": "public", "region": "RegionOne", "url": "http://elsewhere"}
                        ]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let result =
            module::run_alarm_definition(&password_connection(&server), &alarm_spec(State::Present), false)
                .await;

        assert!(result.failed());
        assert!(result.error.as_deref().unwrap().contains("discovery"));
    }
}
