mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt as _;
use tower::ServiceExt as _;

use clubsite::build::{BuildOptions, build_site};
use clubsite::config::SiteConfig;

use support::create_site;

async fn get(app: axum::Router, uri: &str) -> anyhow::Result<(StatusCode, String)> {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = resp.status();
    let body = resp.into_body().collect().await?.to_bytes();
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

#[tokio::test]
async fn index_serves_compiled_template() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let site = create_site(temp.path());
    let config = SiteConfig::load(&site.root, None)?;
    build_site(&config, &BuildOptions::default())?;

    let (status, body) = get(clubsite::serve::router(&config), "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, site.read_template());
    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let site = create_site(temp.path());
    let config = SiteConfig::load(&site.root, None)?;

    let (status, body) = get(clubsite::serve::router(&config), "/health").await?;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
    Ok(())
}

#[tokio::test]
async fn assets_are_served_and_unknown_paths_404() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let site = create_site(temp.path());
    let config = SiteConfig::load(&site.root, None)?;
    let app = clubsite::serve::router(&config);

    let (status, body) = get(app.clone(), "/assets/photos/2022_1.png").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_bytes(), support::ASSET_BYTES);

    let (status, _) = get(app, "/assets/photos/missing.png").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
