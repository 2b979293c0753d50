//! End-to-end engine test over the shipped profile definitions.

use std::sync::Arc;

use async_trait::async_trait;
use site_profiler::error::{ProfileError, Result};
use site_profiler::models::{Profile, SiteContext, Value};
use site_profiler::services::ProfileMatcher;
use site_profiler::store::TemplateStore;
use site_profiler::utils::http::PageFetcher;

const NEXUS_PAGE: &str = r#"
<html>
<head>
  <meta name="generator" content="NexusPHP 1.8.15" />
  <title>Torrents - Demo Tracker</title>
</head>
<body>
<table class="torrents">
<tbody>
<tr>
  <td class="colhead">Title</td>
</tr>
<tr>
  <td class="rowfollow"><a href="details.php?id=100&hit=1">Ubuntu 24.04 Desktop ISO</a>
      <a href="download.php?id=100">DL</a></td>
  <td class="rowfollow"><span title="2024-03-01 12:30:00">1mo ago</span></td>
  <td class="rowfollow">x</td>
  <td class="rowfollow">1.5 GB</td>
  <td class="rowfollow">1,204</td>
  <td class="rowfollow">37</td>
</tr>
<tr>
  <td class="rowfollow"><a href="details.php?id=101">Debian 12 netinst</a>
      <a href="download.php?id=101">DL</a></td>
  <td class="rowfollow"><span title="2024-02-28 08:00:00">2mo ago</span></td>
  <td class="rowfollow">x</td>
  <td class="rowfollow">700 MB</td>
  <td class="rowfollow">87</td>
  <td class="rowfollow">3</td>
</tr>
</tbody>
</table>
</body>
</html>
"#;

/// The engine must never touch the network when HTML is supplied.
struct NoNetwork;

#[async_trait]
impl PageFetcher for NoNetwork {
    async fn fetch(&self, url: &str, _headers: &[(String, String)]) -> Result<String> {
        Err(ProfileError::fetch(url, "network disabled in tests"))
    }
}

fn profiles_dir() -> String {
    format!("{}/profiles", env!("CARGO_MANIFEST_DIR"))
}

fn matcher(store: Arc<TemplateStore>) -> ProfileMatcher {
    ProfileMatcher::new(store, Arc::new(NoNetwork))
}

#[test]
fn shipped_profiles_load_and_round_trip() {
    let store = TemplateStore::from_dir(profiles_dir()).unwrap();
    assert_eq!(
        store.list_profile_ids(),
        vec!["gazelle", "nexusphp", "unit3d"]
    );

    for id in store.list_profile_ids() {
        let profile = store.get(&id).unwrap();
        let serialized = profile.to_toml().unwrap();
        let back = Profile::from_toml(&serialized, &id).unwrap();
        assert_eq!(back, *profile);
    }
}

#[tokio::test]
async fn identify_and_parse_a_nexusphp_site() {
    let store = Arc::new(TemplateStore::from_dir(profiles_dir()).unwrap());
    let matcher = matcher(Arc::clone(&store));
    let ctx =
        SiteContext::new("https://demo-tracker.example/torrents.php").with_html(NEXUS_PAGE);

    let result = matcher
        .identify(&ctx, &["gazelle", "unit3d", "nexusphp"])
        .await
        .expect("page should match the nexusphp profile");
    assert_eq!(result.profile_id, "nexusphp");
    assert_eq!(result.family, "NexusPHP");

    let records = matcher.parse(&ctx, &result.profile_id, "list").await.unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(
        first["title"],
        Some(Value::Text("Ubuntu 24.04 Desktop ISO".to_string()))
    );
    assert_eq!(
        first["link"],
        Some(Value::Text(
            "https://demo-tracker.example/details.php?id=100&hit=1".to_string()
        ))
    );
    assert_eq!(
        first["download"],
        Some(Value::Text(
            "https://demo-tracker.example/download.php?id=100".to_string()
        ))
    );
    assert_eq!(first["size"], Some(Value::Int(1_610_612_736)));
    assert_eq!(first["seeders"], Some(Value::Int(1204)));
    assert_eq!(first["leechers"], Some(Value::Int(37)));
    assert!(matches!(first["added"], Some(Value::Date(_))));

    let second = &records[1];
    assert_eq!(second["seeders"], Some(Value::Int(87)));
    assert_eq!(second["size"], Some(Value::Int(734_003_200)));
}

#[tokio::test]
async fn unknown_site_is_no_match() {
    let store = Arc::new(TemplateStore::from_dir(profiles_dir()).unwrap());
    let matcher = matcher(Arc::clone(&store));
    let ctx = SiteContext::new("https://forum.example/")
        .with_html("<html><head><title>Just a forum</title></head></html>");

    let ids = store.list_profile_ids();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert!(matcher.identify(&ctx, &ids).await.is_none());
}

#[tokio::test]
async fn family_fast_path_needs_no_page() {
    let store = Arc::new(TemplateStore::from_dir(profiles_dir()).unwrap());
    let matcher = matcher(store);
    assert_eq!(matcher.get_family("gazelle").as_deref(), Some("Gazelle"));
    assert_eq!(matcher.get_family("unknown"), None);
}
