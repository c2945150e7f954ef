#![allow(clippy::unwrap_used)]
// Integration tests for `NxapiClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nxkit_api::{
    Credentials, DeviceEndpoint, Error, NxapiClient, OutputFormat, Protocol, Request,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials::new("admin", SecretString::from("secret".to_string()))
}

fn endpoint_for(server: &MockServer) -> DeviceEndpoint {
    let uri = Url::parse(&server.uri()).unwrap();
    DeviceEndpoint::new(uri.host_str().unwrap(), credentials()).with_port(uri.port().unwrap())
}

async fn setup() -> (MockServer, NxapiClient) {
    let server = MockServer::start().await;
    let client = NxapiClient::new(&endpoint_for(&server)).unwrap();
    (server, client)
}

fn xml_reply(outputs: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<ins_api><type>cli_show</type><version>0.1</version>\
         <sid>eoc</sid><outputs>{outputs}</outputs></ins_api>"
    )
}

fn ok_output(body: &str) -> String {
    format!("<output><body>{body}</body><code>200</code><msg>Success</msg></output>")
}

fn failed_output(clierror: &str, msg: &str) -> String {
    format!("<output><clierror>{clierror}</clierror><msg>{msg}</msg><code>400</code></output>")
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_posts_envelope_with_auth_and_cookie() {
    let (server, client) = setup().await;

    let expected_body = Request::show("show version").to_xml();
    Mock::given(method("POST"))
        .and(path("/ins"))
        .and(header("Authorization", "Basic YWRtaW46c2VjcmV0"))
        .and(header("Cookie", "no-cookie"))
        .and(header("Content-Type", "text/xml"))
        .and(body_string(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml_reply(&ok_output(""))))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client.send(&Request::show("show version")).await.unwrap();
    assert_eq!(raw.status.as_u16(), 200);
    assert!(raw.body.contains("<outputs>"));
}

#[tokio::test]
async fn test_threaded_cookie_is_sent() {
    let server = MockServer::start().await;
    let client = NxapiClient::new(&endpoint_for(&server))
        .unwrap()
        .with_cookie("nxapi_auth=abc123");

    Mock::given(method("POST"))
        .and(header("Cookie", "nxapi_auth=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml_reply(&ok_output(""))))
        .expect(1)
        .mount(&server)
        .await;

    client.show("show clock").await.unwrap();
}

#[tokio::test]
async fn test_timeout_is_distinct_from_connection_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(xml_reply(&ok_output("")))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let slow = endpoint_for(&server)
        .with_timeout(Duration::from_millis(200))
        .unwrap();
    let client = NxapiClient::new(&slow).unwrap();
    let timed_out = client.show("show version").await.unwrap_err();
    assert!(timed_out.is_timeout(), "expected Timeout, got: {timed_out:?}");
    assert_eq!(timed_out.to_string(), "Request timed out after 200ms");

    let closed = DeviceEndpoint::new("127.0.0.1", credentials())
        .with_port(1)
        .with_timeout(Duration::from_secs(5))
        .unwrap();
    let refused = NxapiClient::new(&closed)
        .unwrap()
        .show("show version")
        .await
        .unwrap_err();
    assert!(
        matches!(refused, Error::Transport(_)),
        "expected Transport error, got: {refused:?}"
    );
    assert!(!refused.is_timeout());
}

// ── Classification ──────────────────────────────────────────────────

#[tokio::test]
async fn test_single_cli_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(xml_reply(&failed_output("Invalid command", "bad syntax"))),
        )
        .mount(&server)
        .await;

    let err = client.show("show bogus").await.unwrap_err();
    match err {
        Error::Cli {
            code,
            message,
            index,
            ..
        } => {
            assert_eq!(code, "Invalid command");
            assert_eq!(message, "bad syntax");
            assert_eq!(index, 0);
        }
        other => panic!("expected Cli error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_failure_reports_first_failing_command() {
    let (server, client) = setup().await;

    let outputs = format!(
        "{}{}{}",
        ok_output(""),
        failed_output("% Invalid number, range is (1-4094)", "Input CLI command error"),
        ok_output("")
    );
    Mock::given(method("POST"))
        .and(body_string_contains("<type>cli_conf</type>"))
        .and(body_string_contains(
            "<input>vlan 10 ; vlan 5000 ; vlan 20 ;</input>",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml_reply(&outputs)))
        .mount(&server)
        .await;

    let err = client
        .config(["vlan 10", "vlan 5000", "vlan 20"])
        .await
        .unwrap_err();
    assert_eq!(err.command_index(), Some(1));
    assert_eq!(
        err.to_string(),
        "CLI error on command 2 of 3: % Invalid number, range is (1-4094) (Input CLI command error)"
    );
}

#[tokio::test]
async fn test_json_reply_with_batch_outputs() {
    let server = MockServer::start().await;
    let client = NxapiClient::new(&endpoint_for(&server))
        .unwrap()
        .with_output_format(OutputFormat::Json);

    let reply = json!({
        "ins_api": {
            "type": "cli_conf",
            "version": "0.1",
            "sid": "eoc",
            "outputs": { "output": [
                { "body": {}, "code": "200", "msg": "Success" },
                { "body": {}, "code": "200", "msg": "Success" }
            ]}
        }
    });
    Mock::given(method("POST"))
        .and(body_string_contains("<output_format>json</output_format>"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .mount(&server)
        .await;

    let outcomes = client
        .config(["interface Ethernet1/1", "no shutdown"])
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[1].index, 1);
    assert!(outcomes.iter().all(|o| o.is_ok()));
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ins_api><sid>x</sid></ins_api>"))
        .mount(&server)
        .await;

    let err = client.show("show version").await.unwrap_err();
    match err {
        Error::Decode { body, .. } => assert!(body.contains("<sid>x</sid>")),
        other => panic!("expected Decode error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let result = client.show("show version").await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_with_envelope_is_still_classified() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string(xml_reply(&failed_output("% Invalid command", "Input CLI command error"))),
        )
        .mount(&server)
        .await;

    let err = client.show("show bogus").await.unwrap_err();
    assert!(matches!(err, Error::Cli { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_server_error_without_envelope_is_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.show("show version").await.unwrap_err();
    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "Bad Gateway");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_config_batch_is_rejected_without_request() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.config(Vec::<String>::new()).await.unwrap_err();
    assert!(matches!(err, Error::Input { .. }));
}

// ── Behavior ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_repeated_show_yields_identical_outcomes() {
    let (server, client) = setup().await;

    let body = "<TABLE_vlanbrief><ROW_vlanbrief><vlanshowbr-vlanid>1</vlanshowbr-vlanid>\
                </ROW_vlanbrief></TABLE_vlanbrief>";
    Mock::given(method("POST"))
        .and(body_string_contains("<type>cli_show</type>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml_reply(&ok_output(body))))
        .expect(2)
        .mount(&server)
        .await;

    let first = client.show("show vlan brief").await.unwrap();
    let second = client.show("show vlan brief").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.structured().unwrap()["TABLE_vlanbrief"]["ROW_vlanbrief"]["vlanshowbr-vlanid"],
        "1"
    );
}

#[tokio::test]
async fn test_show_text_returns_raw_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<type>cli_show_ascii</type>"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(xml_reply(&ok_output("\n  4096 bytes free\n"))),
        )
        .mount(&server)
        .await;

    let outcome = client.show_text("dir").await.unwrap();
    assert_eq!(outcome.text(), Some("4096 bytes free"));
}

#[test]
fn test_configure_targets_https_ins_endpoint() {
    let endpoint = DeviceEndpoint::new("10.0.0.1", credentials())
        .with_protocol(Protocol::Https)
        .with_timeout(Duration::from_secs(30))
        .unwrap();
    let client = NxapiClient::new(&endpoint).unwrap();
    assert_eq!(client.url().as_str(), "https://10.0.0.1/ins");

    let request = Request::config(["interface Ethernet1/1", "no shutdown"]);
    assert_eq!(request.input(), "interface Ethernet1/1 ; no shutdown ;");
    assert!(
        request
            .to_xml()
            .contains("<input>interface Ethernet1/1 ; no shutdown ;</input>")
    );
}
