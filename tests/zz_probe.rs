//! Temporary debugging probe - to be deleted

use sitelex::crawler::{FetchOutcome, Fetcher};
use sitelex::config::CrawlerConfig;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn probe_fetch() {
    let server = MockServer::start().await;
    println!("server uri: {}", server.uri());

    Mock::given(method("GET"))
        .and(path("/solo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>T</title></head><body>hi</body></html>")
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        user_agent: "SitelexTest/1.0".to_string(),
        referrer: "http://localhost/".to_string(),
        request_delay_ms: 0,
        request_timeout_secs: 5,
        workers: 2,
    };
    let fetcher = Fetcher::new(&config).expect("fetcher");
    let url = Url::parse(&format!("{}/solo", server.uri())).unwrap();
    println!("fetching {}", url);

    match fetcher.fetch(&url).await {
        Ok(FetchOutcome::Html(page)) => {
            println!("HTML status={} final={} body={:?}", page.status, page.final_url, page.body);
        }
        Ok(FetchOutcome::NotHtml { content_type }) => {
            println!("NotHtml content_type={:?}", content_type);
        }
        Err(e) => println!("ERR: {}", e),
    }

    // Also raw reqwest for comparison
    let resp = reqwest::get(url.as_str()).await;
    match resp {
        Ok(r) => println!("raw reqwest: status={} headers={:?}", r.status(), r.headers()),
        Err(e) => println!("raw reqwest err: {}", e),
    }
}
