//! HttpIpSource against a local mock lookup service

use ddns_core::{Error, IpSource, RecordType};
use ddns_ip_http::HttpIpSource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(body: &str, status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn returns_address_for_its_record_type() {
    let server = serve("203.0.113.5\n", 200).await;
    let source = HttpIpSource::new(format!("{}/ip", server.uri()), RecordType::A).unwrap();

    let ip = source.current(RecordType::A).await.unwrap();
    assert_eq!(ip, Some("203.0.113.5".parse().unwrap()));
}

#[tokio::test]
async fn other_record_type_is_not_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.5"))
        .expect(0)
        .mount(&server)
        .await;

    let source = HttpIpSource::new(format!("{}/ip", server.uri()), RecordType::A).unwrap();
    assert_eq!(source.current(RecordType::Aaaa).await.unwrap(), None);
}

#[tokio::test]
async fn json_body_is_accepted() {
    let server = serve(r#"{"ip": "2001:db8::42"}"#, 200).await;
    let source = HttpIpSource::new(format!("{}/ip", server.uri()), RecordType::Aaaa).unwrap();

    let ip = source.current(RecordType::Aaaa).await.unwrap();
    assert_eq!(ip, Some("2001:db8::42".parse().unwrap()));
}

#[tokio::test]
async fn wrong_family_in_body_is_an_error() {
    let server = serve("203.0.113.5", 200).await;
    let source = HttpIpSource::new(format!("{}/ip", server.uri()), RecordType::Aaaa).unwrap();

    let err = source.current(RecordType::Aaaa).await.unwrap_err();
    assert!(matches!(err, Error::IpSource(_)), "got {:?}", err);
}

#[tokio::test]
async fn http_error_status_is_an_error() {
    let server = serve("203.0.113.5", 503).await;
    let source = HttpIpSource::new(format!("{}/ip", server.uri()), RecordType::A).unwrap();

    let err = source.current(RecordType::A).await.unwrap_err();
    assert!(err.to_string().contains("503"), "{}", err);
}
