//! Registry lookup tests against a mock npm registry

use reflint::{Document, Lookup, LookupError, Options, Outcome, Reflinks, RegistryLookup};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn registry() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/verb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "verb",
            "homepage": "https://github.com/verbose/verb",
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "generate",
            "repository": {
                "type": "git",
                "url": "git+https://github.com/generate/generate.git",
            },
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "bare" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    // anything else is unknown to the registry
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_lookup_resolves_homepage_and_repository() {
    let server = registry().await;
    let lookup = RegistryLookup::new(&server.uri(), 5_000).unwrap();

    let res = lookup
        .lookup(&names(&["generate", "unknown", "verb"]), &Options::default())
        .await
        .unwrap();

    assert_eq!(
        res.links,
        vec![
            "[generate]: https://github.com/generate/generate",
            "[verb]: https://github.com/verbose/verb",
        ]
    );
}

#[tokio::test]
async fn test_lookup_fallback_option() {
    let server = registry().await;
    let lookup = RegistryLookup::new(&server.uri(), 5_000).unwrap();

    let res = lookup
        .lookup(&names(&["bare"]), &Options::default())
        .await
        .unwrap();
    assert_eq!(res.links, vec!["[bare]: https://www.npmjs.com/package/bare"]);

    let options: Options = serde_json::from_value(json!({ "fallback": false })).unwrap();
    let res = lookup.lookup(&names(&["bare"]), &options).await.unwrap();
    assert!(res.links.is_empty());
}

#[tokio::test]
async fn test_lookup_errors() {
    let server = registry().await;
    let lookup = RegistryLookup::new(&server.uri(), 5_000).unwrap();

    let err = lookup
        .lookup(&names(&["verb", "broken"]), &Options::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Status { ref name, status: 500 } if name == "broken"));

    let err = lookup
        .lookup(&names(&["garbled"]), &Options::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Decode { .. }));
}

#[tokio::test]
async fn test_transform_with_registry() {
    let server = registry().await;
    let lookup = RegistryLookup::new(&server.uri(), 5_000).unwrap();
    let reflinks = Reflinks::new(lookup, Options::default());

    let mut doc = Document::new(
        "README.md",
        "This is a reflink\n[verb][]\n[generate][]\n[not-published]\n",
    );
    let outcome = reflinks.apply(&mut doc).await.unwrap();

    assert_eq!(outcome, Outcome::Appended { lines: 2 });
    assert_eq!(
        doc.reflinks,
        Some(names(&["generate", "not-published", "verb"]))
    );
    assert!(doc.text().unwrap().ends_with(
        "\n\n[generate]: https://github.com/generate/generate\n[verb]: https://github.com/verbose/verb"
    ));
}

#[tokio::test]
async fn test_transform_failure_leaves_document() {
    let server = registry().await;
    let lookup = RegistryLookup::new(&server.uri(), 5_000).unwrap();
    let reflinks = Reflinks::new(lookup, Options::default());

    let original = "[verb] and [broken]\n";
    let mut doc = Document::new("README.md", original);
    assert!(reflinks.apply(&mut doc).await.is_err());
    assert_eq!(doc.contents.as_deref(), Some(original.as_bytes()));
}
