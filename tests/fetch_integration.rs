//! Issue fetching against a wiremock GitHub API

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use ghissues::models::{DateWindow, FilterCriteria, RepoRef};
use ghissues::{Error, GitHubClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISSUES_PATH: &str = "/repos/acme/widgets/issues";

fn issue_json(number: u64, closed_at: DateTime<Utc>) -> Value {
    json!({
        "number": number,
        "title": format!("Issue {number}"),
        "user": {"login": "alice"},
        "assignees": [],
        "labels": [{"name": "bug"}],
        "state": "closed",
        "created_at": (closed_at - Duration::days(2)).to_rfc3339(),
        "updated_at": closed_at.to_rfc3339(),
        "closed_at": closed_at.to_rfc3339(),
        "html_url": format!("https://github.com/acme/widgets/issues/{number}")
    })
}

fn next_link(server: &MockServer, page: u32) -> String {
    format!(
        "<{}{}?state=closed&per_page=100&page={}>; rel=\"next\"",
        server.uri(),
        ISSUES_PATH,
        page
    )
}

fn recent_window() -> DateWindow {
    DateWindow::resolve(30, None, None, Utc::now()).expect("valid window")
}

fn january_window() -> DateWindow {
    DateWindow::resolve(
        30,
        NaiveDate::from_ymd_opt(2024, 1, 1),
        NaiveDate::from_ymd_opt(2024, 1, 31),
        Utc::now(),
    )
    .expect("valid window")
}

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::with_base_url("test-token", &server.uri()).expect("Failed to build client")
}

fn criteria(window: DateWindow) -> FilterCriteria {
    FilterCriteria::new(RepoRef::new("acme", "widgets"), window)
}

#[tokio::test]
async fn test_paginates_250_issues() {
    let server = MockServer::start().await;
    let now = Utc::now();
    let issues: Vec<Value> = (1..=250)
        .map(|n| issue_json(n, now - Duration::minutes(n as i64)))
        .collect();

    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&issues[0..100])
                .insert_header("link", next_link(&server, 2).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&issues[100..200])
                .insert_header("link", next_link(&server, 3).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&issues[200..250]))
        .expect(1)
        .mount(&server)
        .await;

    let records = client(&server)
        .fetch_issues(&criteria(recent_window()))
        .await
        .expect("fetch succeeds");

    assert_eq!(records.len(), 250);
    let numbers: HashSet<u64> = records.iter().map(|r| r.number).collect();
    assert_eq!(numbers, (1..=250).collect::<HashSet<u64>>());
}

#[tokio::test]
async fn test_issue_closed_after_until_excluded() {
    let server = MockServer::start().await;
    let closed_feb = "2024-02-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let closed_jan = "2024-01-15T10:00:00Z".parse::<DateTime<Utc>>().unwrap();

    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .and(query_param("since", "2024-01-01T00:00:00Z"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vec![issue_json(2, closed_feb), issue_json(1, closed_jan)]),
        )
        .mount(&server)
        .await;

    let records = client(&server)
        .fetch_issues(&criteria(january_window()))
        .await
        .expect("fetch succeeds");

    let numbers: Vec<u64> = records.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![1]);
}

#[tokio::test]
async fn test_stops_one_page_past_window_start() {
    let server = MockServer::start().await;
    let jan = |day: u32| {
        format!("2024-01-{day:02}T10:00:00Z")
            .parse::<DateTime<Utc>>()
            .unwrap()
    };
    let dec = "2023-12-20T10:00:00Z".parse::<DateTime<Utc>>().unwrap();

    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vec![issue_json(3, jan(20)), issue_json(2, dec)])
                .insert_header("link", next_link(&server, 2).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vec![issue_json(1, jan(2))])
                .insert_header("link", next_link(&server, 3).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Value>::new()))
        .expect(0)
        .mount(&server)
        .await;

    let records = client(&server)
        .fetch_issues(&criteria(january_window()))
        .await
        .expect("fetch succeeds");

    let numbers: Vec<u64> = records.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![3, 1]);
}

async fn fetch_with_response(response: ResponseTemplate) -> Error {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .respond_with(response)
        .mount(&server)
        .await;

    client(&server)
        .fetch_issues(&criteria(recent_window()))
        .await
        .expect_err("fetch should fail")
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let err = fetch_with_response(
        ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
    )
    .await;
    assert!(matches!(err, Error::Auth(ref msg) if msg.contains("Bad credentials")));
}

#[tokio::test]
async fn test_missing_repo_is_not_found() {
    let err = fetch_with_response(
        ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})),
    )
    .await;
    assert!(matches!(err, Error::NotFound(ref what) if what.contains("acme/widgets")));
}

#[tokio::test]
async fn test_exhausted_quota_is_rate_limited() {
    let err = fetch_with_response(
        ResponseTemplate::new(403)
            .insert_header("x-ratelimit-limit", "5000")
            .insert_header("x-ratelimit-remaining", "0")
            .insert_header("x-ratelimit-reset", "1704067200")
            .set_body_json(json!({"message": "API rate limit exceeded"})),
    )
    .await;

    match err {
        Error::RateLimited { reset_at } => {
            assert_eq!(reset_at, Some("2024-01-01T00:00:00Z".parse().unwrap()));
        }
        other => panic!("expected rate limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_with_quota_left() {
    let err = fetch_with_response(
        ResponseTemplate::new(403)
            .insert_header("x-ratelimit-remaining", "4999")
            .set_body_json(json!({"message": "Resource not accessible by integration"})),
    )
    .await;
    assert!(matches!(err, Error::Forbidden(ref msg) if msg.contains("not accessible")));
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_other_status_is_request_error() {
    let err = fetch_with_response(ResponseTemplate::new(500).set_body_string("boom")).await;
    assert!(matches!(err, Error::Request { status: 500, ref message } if message == "boom"));
}

#[tokio::test]
async fn test_reports_quota_from_last_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ISSUES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-limit", "5000")
                .insert_header("x-ratelimit-remaining", "4321")
                .set_body_json(Vec::<Value>::new()),
        )
        .mount(&server)
        .await;

    let github = client(&server);
    assert!(github.rate_limit_status().is_none());

    github
        .fetch_issues(&criteria(recent_window()))
        .await
        .expect("fetch succeeds");

    let quota = github.rate_limit_status().expect("quota recorded");
    assert_eq!(quota.remaining, 4321);
    assert_eq!(quota.limit, Some(5000));
}
