//! Integration test: scan a corpus, persist the lists, then localize from the persisted list.

use blogsnap_core::extract::{read_list, scan_corpus, ListSelection, ALL_ASSETS_FILE};
use blogsnap_core::rewrite::{localize_corpus, RewriteRule, RuleSet, UrlMapping};
use blogsnap_core::url_model::Normalizer;
use std::fs;
use tempfile::tempdir;

const ENTRY: &str = r#"<html><head>
<link rel="stylesheet" href="/css/blog.css?v=3">
<script src="//cdn.example.com/js/lib.js"></script>
<meta property="og:image" content="https://img.example.com/u/photo.JPG">
</head><body>
<a href="/user/e/2">next entry</a>
<div style="background: url('/img/bg.png')"></div>
<img src="/img/x.gif"><img src='/img/x.gif'>
</body></html>"#;

#[test]
fn scan_then_localize_from_persisted_list() {
    let root = tempdir().unwrap();
    let html_dir = root.path().join("raw_html");
    let assets = root.path().join("assets");
    let output = root.path().join("local_html");
    fs::create_dir_all(html_dir.join("user").join("e")).unwrap();
    fs::write(html_dir.join("user").join("e").join("1.html"), ENTRY).unwrap();
    fs::write(html_dir.join("index.html"), r#"<img src="/img/x.gif">"#).unwrap();

    let normalizer = Normalizer::new("https://blog.example.com").unwrap();
    let scan = scan_corpus(&html_dir).unwrap();
    assert_eq!(scan.html_files, 2);
    assert_eq!(scan.lists.all.len(), 5);
    assert_eq!(scan.lists.css.len(), 1);
    assert_eq!(scan.lists.js.len(), 1);
    assert_eq!(scan.lists.images.len(), 3);
    scan.lists.write(&assets, &normalizer).unwrap();

    let (_, normalized) = ListSelection::All.load(&assets).unwrap();
    assert!(normalized.contains("https://cdn.example.com/js/lib.js"));

    let urls = read_list(&assets.join(ALL_ASSETS_FILE)).unwrap();
    let mapping = UrlMapping::build(&urls, &normalizer);
    let rules = RuleSet::compile(&[RewriteRule {
        pattern: r"\?v=\d+".to_string(),
        replacement: String::new(),
    }])
    .unwrap();
    let summary = localize_corpus(&html_dir, &output, &mapping, &rules).unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.files_changed, 2);
    // css, js, og:image, background, two img tags in the entry; one img in the index.
    assert_eq!(summary.substitutions, 7);
    assert_eq!(summary.rule_substitutions, 1);

    let page = fs::read_to_string(output.join("user").join("e").join("1.html")).unwrap();
    assert!(page.contains(r#"href="/assets/blog.example.com/css/blog.css""#));
    assert!(page.contains(r#"src="/assets/cdn.example.com/js/lib.js""#));
    assert!(page.contains(r#"content="/assets/img.example.com/u/photo.JPG""#));
    assert!(page.contains("url('/assets/blog.example.com/img/bg.png')"));
    assert!(page.contains(r#"src='/assets/blog.example.com/img/x.gif'"#));
    assert!(page.contains(r#"href="/user/e/2""#));

    // Input corpus is untouched.
    assert_eq!(
        fs::read_to_string(html_dir.join("user").join("e").join("1.html")).unwrap(),
        ENTRY
    );
}
