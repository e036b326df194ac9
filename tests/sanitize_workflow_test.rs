//! Sanitize Workflow Integration Tests
//!
//! End-to-end write transactions through the options manager:
//! - Enum fallback from previous to default across saves
//! - Compound completeness and pass-through
//! - Site catalog behaviour on realistic form posts
//! - Persistence across manager instances

mod common;

use common::{TestFixture, as_map, init_logging};
use rcsan::catalog::SITE_SETTINGS;
use rcsan::{OptionsManager, Rule, StaticDefaults};
use serde_json::json;

// =============================================================================
// Enum Fallback Across Writes
// =============================================================================

#[test]
fn test_title_location_fallback_then_accept() {
    init_logging();
    let manager = OptionsManager::builder("test-app")
        .with_catalog(|registry| {
            registry.define_rule("left_right", Rule::one_of(["left", "right"]))?;
            registry.register("left_right", "title_location", ());
            Ok(())
        })
        .with_defaults(StaticDefaults::new().with("title_location", json!("left")))
        .build_in_memory();

    assert_eq!(manager.stored("title_location"), None);

    let first = manager.save("title_location", &json!("center")).unwrap();
    assert_eq!(first, json!("left"));
    assert_eq!(manager.stored("title_location"), Some(json!("left")));

    let second = manager.save("title_location", &json!("right")).unwrap();
    assert_eq!(second, json!("right"));

    // Invalid again: previous wins over the default now
    let third = manager.save("title_location", &json!("up")).unwrap();
    assert_eq!(third, json!("right"));
}

// =============================================================================
// Compound Keys
// =============================================================================

#[test]
fn test_partial_form_post_fills_every_site_key() {
    let fixture = TestFixture::new();
    let saved = fixture.save_site(json!({"og_tags": "on"}));
    let saved = as_map(&saved);

    let registry = fixture.manager.registry().unwrap();
    let rcsan::Binding::Compound(subs) = registry.lookup(SITE_SETTINGS).unwrap() else {
        panic!("site settings should be compound");
    };
    for sub in subs.keys() {
        assert!(saved.contains_key(sub), "{sub} missing from saved bundle");
    }

    assert_eq!(saved["og_tags"], json!(1));
    assert_eq!(saved["twitter_tags"], json!(0));
    assert_eq!(saved["title_separator"], json!("pipe"));
    assert_eq!(saved["sitemap_query_limit"], json!(3000));
    assert_eq!(saved["sitemap_color_main"], json!(""));
}

#[test]
fn test_unregistered_sub_keys_pass_through() {
    let fixture = TestFixture::new();
    let saved = fixture.save_site(json!({
        "custom_plugin_flag": "<b>raw</b>",
        "nested": {"a": [1, 2]},
    }));

    assert_eq!(saved["custom_plugin_flag"], json!("<b>raw</b>"));
    assert_eq!(saved["nested"], json!({"a": [1, 2]}));
}

#[test]
fn test_undefined_rule_on_compound_is_identity() {
    let manager = OptionsManager::builder("test-app")
        .with_catalog(|registry| {
            registry.register("never_defined", "widgets", ["present", "absent"]);
            Ok(())
        })
        .build_in_memory();

    let saved = manager
        .save("widgets", &json!({"present": "<b>kept</b>", "extra": 1}))
        .unwrap();

    // Registered sub-keys are still filled in, with the empty value
    assert_eq!(saved, json!({"present": "<b>kept</b>", "absent": "", "extra": 1}));
}

#[test]
fn test_unregistered_keys_pass_through() {
    let fixture = TestFixture::new();
    for value in [json!("text"), json!(42), json!({"any": "shape"}), json!(null)] {
        assert_eq!(fixture.manager.save("unregistered_key", &value).unwrap(), value);
    }
}

// =============================================================================
// Site Catalog On Realistic Input
// =============================================================================

#[test]
fn test_site_catalog_normalizes_form_post() {
    let fixture = TestFixture::new();
    let saved = fixture.save_site(json!({
        "title_separator": "ndash",
        "homepage_title": "My\r\n\r\nSite\tName   ",
        "homepage_description": "Line one\nLine&nbsp;two",
        "knowledge_type": "robot",
        "alter_archive_query_type": "bogus",
        "social_image_fb_id": "-12",
        "timestamps_format": 0,
        "google_verification": " <meta> abc 123 ",
        "knowledge_facebook": "https://facebook.com/page?utm=1",
        "knowledge_linkedin": "https://linkedin.com/company/x?trk=1",
        "facebook_author": "https://x.com/profile.php?id=123&ref=abc",
        "twitter_creator": "https://twitter.com/someone/",
        "twitter_card": "gallery",
        "canonical_scheme": "https",
        "sitemap_color_accent": "#ABC",
        "sitemap_query_limit": -5,
        "disabled_post_types": {"post": 1, "product": "1"},
        "noindex_post_types": {"attachment": "on", "post": ""},
    }));

    assert_eq!(saved["title_separator"], json!("ndash"));
    assert_eq!(saved["homepage_title"], json!("My Site Name"));
    assert_eq!(saved["homepage_description"], json!("Line one Line two"));
    assert_eq!(saved["knowledge_type"], json!("organization"));
    assert_eq!(saved["alter_archive_query_type"], json!("in_query"));
    assert_eq!(saved["social_image_fb_id"], json!(0));
    assert_eq!(saved["timestamps_format"], json!("0"));
    assert_eq!(saved["google_verification"], json!("abc123"));
    assert_eq!(saved["knowledge_facebook"], json!("https://facebook.com/page"));
    assert_eq!(saved["knowledge_linkedin"], json!("https://linkedin.com/company/x?trk=1"));
    assert_eq!(
        saved["facebook_author"],
        json!("https://www.facebook.com/profile.php?id=123")
    );
    assert_eq!(saved["twitter_creator"], json!("@someone"));
    assert_eq!(saved["twitter_card"], json!("summary_large_image"));
    assert_eq!(saved["canonical_scheme"], json!("https"));
    assert_eq!(saved["sitemap_color_accent"], json!("ABC"));
    assert_eq!(saved["sitemap_query_limit"], json!(1));
    assert_eq!(saved["disabled_post_types"], json!({"product": 1}));
    assert_eq!(saved["noindex_post_types"], json!({"attachment": 1, "post": 0}));
}

#[test]
fn test_profile_links_through_site_catalog() {
    let fixture = TestFixture::new();
    let saved = fixture.save_site(json!({
        "facebook_publisher": "https://facebook.com/profile.php?ref=abc",
        "facebook_author": "https://facebook.com/pages/Name/?sk=about",
    }));

    // profile.php without an id is rejected; other links keep their query
    assert_eq!(saved["facebook_publisher"], json!(""));
    assert_eq!(
        saved["facebook_author"],
        json!("https://www.facebook.com/pages/Name/?sk=about")
    );
}

#[test]
fn test_saving_accepted_bundle_is_stable() {
    let fixture = TestFixture::new();
    let first = fixture.save_site(json!({
        "homepage_title": "A\tB",
        "twitter_site": "@brand",
        "sitemap_query_limit": 999999,
    }));
    let stored = fixture.manager.stored(SITE_SETTINGS).unwrap();
    let second = fixture.save_site(stored.clone());

    assert_eq!(first["sitemap_query_limit"], json!(50000));
    assert_eq!(second, stored);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_values_survive_reopen() {
    let fixture = TestFixture::new();
    fixture.save_site(json!({"title_location": "left", "title_separator": "dash"}));
    assert!(fixture.settings_path().exists());

    let reopened = fixture.reopen();
    assert_eq!(reopened.option("title_location"), Some(json!("left")));
    assert_eq!(reopened.option("title_seperator"), Some(json!("dash")));
    assert_eq!(reopened.stored("db_version"), Some(json!("3103")));

    // Previous value now comes from the file
    let saved = reopened.save(SITE_SETTINGS, &json!({"title_location": "middle"})).unwrap();
    assert_eq!(saved["title_location"], json!("left"));
}

#[test]
fn test_option_reads_defaults_before_first_save() {
    let fixture = TestFixture::new();
    assert_eq!(fixture.manager.option("twitter_card"), Some(json!("summary_large_image")));
    assert_eq!(fixture.manager.option("not_a_setting"), None);
    assert!(!fixture.settings_path().exists());
}
