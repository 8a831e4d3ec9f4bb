//! Integration tests for the Seniverse client using wiremock
//!
//! These run the full lookup against a mock HTTP server for both auth
//! schemes and check how HTTP failures reach the user.

use std::time::Duration;

use seniverse_core::{
    AuthScheme, CityTable, ClientError, Config, ForecastError, Forecaster, SeniverseClient,
    signer::{canonical_query, signature},
};
use wiremock::{
    Match, Mock, MockServer, Request, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

const CITIES: &str = "\
序号,城市ID,行政归属,城市简称,拼音,lat,lon
1,WX4FBXXFKE4W,中国/北京,北京,beijing,39.90403,116.407526
2,WX4FTESTCHAO,中国/北京/北京,北京/朝阳,chaoyang,39.92147,116.44311
";

const DAILY_PATH: &str = "/v3/weather/daily.json";

fn sample_daily_response(days: usize) -> serde_json::Value {
    let daily: Vec<_> = (0..days)
        .map(|i| {
            serde_json::json!({
                "date": format!("2025-04-{:02}", 21 + i),
                "text_day": "小雨",
                "code_day": "13",
                "text_night": "多云",
                "code_night": "4",
                "high": "18",
                "low": "12",
                "rainfall": "1.28",
                "precip": "0.88",
                "wind_direction": "北",
                "wind_direction_degree": "0",
                "wind_speed": "8.4",
                "wind_scale": "2",
                "humidity": "78"
            })
        })
        .collect();

    serde_json::json!({
        "results": [{
            "location": {
                "id": "WX4FBXXFKE4W",
                "name": "北京",
                "country": "CN",
                "path": "北京,北京,中国",
                "timezone": "Asia/Shanghai",
                "timezone_offset": "+08:00"
            },
            "daily": daily,
            "last_update": "2025-04-21T08:00:00+08:00"
        }]
    })
}

/// Accepts only requests whose `sig` matches the rest of the query.
struct ValidSignature(&'static str);

impl Match for ValidSignature {
    fn matches(&self, request: &Request) -> bool {
        let mut sig = None;
        let mut pairs = Vec::new();
        for (k, v) in request.url.query_pairs() {
            if k == "sig" {
                sig = Some(v.into_owned());
            } else {
                pairs.push((k.into_owned(), v.into_owned()));
            }
        }
        let borrowed: Vec<(&str, String)> =
            pairs.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();

        sig.is_some_and(|got| got == signature(self.0, &canonical_query(&borrowed)))
    }
}

fn create_forecaster(mock_server: &MockServer, scheme: AuthScheme) -> Forecaster {
    let config = Config {
        // Trailing slash must not double up in the request path.
        base_url: format!("{}/v3/", mock_server.uri()),
        private_key: "PRIVATE".to_string(),
        public_key: "pub".to_string(),
        auth_scheme: scheme,
        default_days: 3,
        ..Config::default()
    };
    let table = CityTable::load(CITIES.as_bytes()).expect("test city list parses");
    let client = SeniverseClient::new(Duration::from_secs(5)).expect("client builds");
    Forecaster::new(config, table, Box::new(client))
}

async fn mount(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(DAILY_PATH))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_private_scheme_sends_plain_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DAILY_PATH))
        .and(query_param("key", "PRIVATE"))
        .and(query_param("location", "WX4FBXXFKE4W"))
        .and(query_param("start", "0"))
        .and(query_param("days", "3"))
        .and(query_param_is_missing("sig"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_daily_response(3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let forecaster = create_forecaster(&mock_server, AuthScheme::Private);
    let text = forecaster.forecast("北京", None).await.expect("forecast succeeds");

    assert_eq!(text.matches("    天气：小雨 转 多云").count(), 3);
    assert!(text.contains("    温度：12 - 18 ℃"));
    assert!(text.contains("    北风2级"));
}

#[tokio::test]
async fn test_public_scheme_sends_verifiable_signature() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DAILY_PATH))
        .and(query_param("public_key", "pub"))
        .and(query_param("location", "WX4FTESTCHAO"))
        .and(query_param("ttl", "60"))
        .and(query_param("days", "2"))
        .and(query_param_is_missing("key"))
        .and(ValidSignature("PRIVATE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_daily_response(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let forecaster = create_forecaster(&mock_server, AuthScheme::Public);
    let result = forecaster.forecast("北京/朝阳区", Some("2")).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

#[tokio::test]
async fn test_free_tier_window_is_reported() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(200).set_body_json(sample_daily_response(3))).await;

    let forecaster = create_forecaster(&mock_server, AuthScheme::Private);
    let text = forecaster.reply("北京", Some("5")).await;

    assert!(text.starts_with("免费用户只能获取最近3天的信息：\n"));
    assert_eq!(text.matches("    天气：").count(), 3);
}

// ============================================================================
// Error scenarios
// ============================================================================

#[tokio::test]
async fn test_forbidden_maps_to_auth_error_for_both_schemes() {
    for scheme in AuthScheme::all() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "status": "The API key is invalid.",
                "status_code": "AP010003"
            })),
        )
        .await;

        let forecaster = create_forecaster(&mock_server, *scheme);
        let err = forecaster.forecast("北京", None).await.unwrap_err();

        assert!(
            matches!(err, ForecastError::Client(ClientError::AuthOrQuota { paid_area: false, .. })),
            "{scheme}: {err:?}"
        );
        assert_eq!(
            err.user_message(),
            "🔒 请求被拒绝 查询的是付费区域或密钥设置错误"
        );
    }
}

#[tokio::test]
async fn test_forbidden_paid_area_is_distinguished() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "status": "You do not have access to this location.",
            "status_code": "AP010006"
        })),
    )
    .await;

    let forecaster = create_forecaster(&mock_server, AuthScheme::Public);
    let text = forecaster.reply("北京", None).await;

    assert_eq!(text, "🔒 请求被拒绝 查询的是付费区域");
}

#[tokio::test]
async fn test_not_found_maps_to_endpoint_error_for_both_schemes() {
    for scheme in AuthScheme::all() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, ResponseTemplate::new(404)).await;

        let forecaster = create_forecaster(&mock_server, *scheme);
        let err = forecaster.forecast("北京", None).await.unwrap_err();

        assert!(
            matches!(err, ForecastError::Client(ClientError::EndpointConfig)),
            "{scheme}: {err:?}"
        );
        assert_eq!(err.user_message(), "🚫 请求失败 请检查url设置");
    }
}

#[tokio::test]
async fn test_server_error_is_unknown_and_not_shown() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(500).set_body_string("stack trace: db at 10.0.0.9"),
    )
    .await;

    let forecaster = create_forecaster(&mock_server, AuthScheme::Private);

    let err = forecaster.forecast("北京", None).await.unwrap_err();
    assert!(matches!(err, ForecastError::Client(ClientError::Unknown(_))));

    let text = forecaster.reply("北京", None).await;
    assert_eq!(text, "❌ 未知错误，请查看日志！");
    assert!(!text.contains("10.0.0.9"));
}

#[tokio::test]
async fn test_empty_daily_payload() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
    )
    .await;

    let forecaster = create_forecaster(&mock_server, AuthScheme::Private);
    let err = forecaster.forecast("北京", None).await.unwrap_err();

    assert!(matches!(err, ForecastError::EmptyPayload));
    assert_eq!(err.user_message(), "收到的返回为空");
}

#[tokio::test]
async fn test_slow_response_hits_client_timeout() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(sample_daily_response(3))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let config = Config {
        base_url: format!("{}/v3", mock_server.uri()),
        private_key: "PRIVATE".to_string(),
        ..Config::default()
    };
    let table = CityTable::load(CITIES.as_bytes()).expect("test city list parses");
    let client = SeniverseClient::new(Duration::from_millis(200)).expect("client builds");
    let forecaster = Forecaster::new(config, table, Box::new(client));

    let err = forecaster.forecast("北京", None).await.unwrap_err();
    assert!(matches!(err, ForecastError::Client(ClientError::Unknown(_))));
}

#[tokio::test]
async fn test_unknown_city_never_reaches_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let forecaster = create_forecaster(&mock_server, AuthScheme::Private);
    let text = forecaster.reply("火星", None).await;

    assert_eq!(text, "未找到城市：火星 区级请用 北京/朝阳 写法");
}

#[tokio::test]
async fn test_unreachable_server_error_carries_no_credentials() {
    for scheme in AuthScheme::all() {
        let config = Config {
            // Nothing listens on port 1.
            base_url: "http://127.0.0.1:1/v3".to_string(),
            private_key: "UNREACHABLEKEY".to_string(),
            public_key: "pub".to_string(),
            auth_scheme: *scheme,
            ..Config::default()
        };
        let table = CityTable::load(CITIES.as_bytes()).expect("test city list parses");
        let client = SeniverseClient::new(Duration::from_secs(5)).expect("client builds");
        let forecaster = Forecaster::new(config, table, Box::new(client));

        let err = forecaster.forecast("北京", None).await.unwrap_err();
        let ForecastError::Client(ClientError::Unknown(detail)) = &err else {
            panic!("{scheme}: unexpected error {err:?}");
        };

        let logged = format!("{err:?}");
        assert!(!logged.contains("UNREACHABLEKEY"), "{scheme}: {logged}");
        assert!(!logged.contains("sig="), "{scheme}: {logged}");
        assert!(!logged.contains("key="), "{scheme}: {logged}");
        assert!(
            detail.len() > "failed to send request: error sending request".len(),
            "{scheme}: cause missing from {detail}"
        );
    }
}
