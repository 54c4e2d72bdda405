use cjb_site::core::templates::MailIdentity;
use cjb_site::core::{EmailTemplate, Notifier};
use cjb_site::{Kind, Record, RelayNotifier, SiteError};
use httpmock::prelude::*;

fn identity() -> MailIdentity {
    MailIdentity {
        sender: "site@cjb.org".to_string(),
        organization_name: "Christian Jewish Believers".to_string(),
        site_name: "CJB Website".to_string(),
    }
}

fn school_record() -> Record {
    serde_json::from_value(serde_json::json!({
        "firstName": "Eli",
        "lastName": "Ben",
        "email": "eli@example.com",
        "submittedAt": "2024-06-01T12:00:00Z",
    }))
    .unwrap()
}

#[tokio::test]
async fn test_relay_receives_rendered_message() {
    let server = MockServer::start();

    let relay_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/send")
            .header("authorization", "Bearer relay-token")
            .json_body_partial(
                r#"{
                    "from": "\"Christian Jewish Believers\" <site@cjb.org>",
                    "to": "eli@example.com",
                    "subject": "School of Eschatology Registration Received"
                }"#,
            );
        then.status(202);
    });

    let notifier = RelayNotifier::new(
        server.url("/send"),
        Some("relay-token".to_string()),
        identity(),
    )
    .unwrap();

    notifier
        .notify(
            EmailTemplate::Confirmation(Kind::School),
            "eli@example.com",
            &school_record(),
        )
        .await
        .unwrap();

    relay_mock.assert();
}

#[tokio::test]
async fn test_relay_error_status_is_notification_error() {
    let server = MockServer::start();

    let relay_mock = server.mock(|when, then| {
        when.method(POST).path("/send");
        then.status(503).body("mailbox unavailable");
    });

    let notifier = RelayNotifier::new(server.url("/send"), None, identity()).unwrap();

    let err = notifier
        .notify(
            EmailTemplate::Alert(Kind::School),
            "school@cjb.org",
            &school_record(),
        )
        .await
        .unwrap_err();

    relay_mock.assert();
    match err {
        SiteError::NotificationError { message } => {
            assert!(message.contains("503"));
            assert!(message.contains("mailbox unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_relay_is_notification_error() {
    // 保留的埠號，連線會被拒絕
    let notifier =
        RelayNotifier::new("http://127.0.0.1:9/send".to_string(), None, identity()).unwrap();

    let err = notifier
        .notify(
            EmailTemplate::Alert(Kind::Tour),
            "tours@cjb.org",
            &school_record(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SiteError::NotificationError { .. }));
}
