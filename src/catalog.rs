//! Site settings catalog
//!
//! The complete registration pass for the SEO site-settings bundle: rule
//! definitions, key bindings, static defaults and compatibility steps.
//!
//! ```rust
//! use rcsan::{OptionsManager, catalog};
//! use serde_json::json;
//!
//! let manager = OptionsManager::builder("my-site")
//!     .with_site_catalog()
//!     .build_in_memory();
//!
//! let saved = manager
//!     .save(catalog::SITE_SETTINGS, &json!({"title_separator": "tilde"}))
//!     .unwrap();
//! assert_eq!(saved["title_separator"], json!("pipe"));
//! ```

use crate::defaults::StaticDefaults;
use crate::error::Result;
use crate::migrate::Migrator;
use crate::registry::Registry;
use crate::rules::Rule;
use serde_json::{Map, Value, json};

/// Default bundle key of the site settings
pub const SITE_SETTINGS: &str = crate::config::DEFAULT_SETTINGS_FIELD;

/// Title and description separator names
pub const SEPARATORS: &[&str] = &[
    "pipe", "dash", "ndash", "mdash", "bull", "middot", "lsaquo", "rsaquo", "frasl", "laquo",
    "raquo", "le", "ge", "lt", "gt",
];

/// Knowledge graph entity types
pub const KNOWLEDGE_TYPES: &[&str] = &["organization", "person"];

/// How archive and search queries are altered
pub const QUERY_TYPES: &[&str] = &["in_query", "post_query"];

/// Canonical URL scheme choices
pub const CANONICAL_SCHEMES: &[&str] = &["automatic", "https", "http"];

/// Twitter card types
pub const TWITTER_CARDS: &[&str] = &["summary", "summary_large_image"];

/// Post types that can never be disabled
pub const FORCED_POST_TYPES: &[&str] = &["post", "page", "attachment"];

/// Robots directives with per-post-type settings
pub const ROBOTS: &[&str] = &["noindex", "nofollow", "noarchive"];

/// Sub-key holding the post-type set for a robots directive
#[must_use]
pub fn robots_post_type_option_id(robot: &str) -> String {
    format!("{robot}_post_types")
}

const BOOLEAN_KEYS: &[&str] = &[
    "alter_search_query",
    "alter_archive_query",
    "display_pixel_counter",
    "display_character_counter",
    "cache_meta_schema",
    "cache_sitemap",
    "cache_object",
    "display_seo_bar_tables",
    "display_seo_bar_metabox",
    "title_rem_additions",
    "title_rem_prefixes",
    "title_strip_tags",
    "auto_description",
    "description_additions",
    "description_blogname",
    "category_noindex",
    "tag_noindex",
    "author_noindex",
    "date_noindex",
    "search_noindex",
    "attachment_noindex",
    "site_noindex",
    "category_nofollow",
    "tag_nofollow",
    "author_nofollow",
    "date_nofollow",
    "search_nofollow",
    "attachment_nofollow",
    "site_nofollow",
    "category_noarchive",
    "tag_noarchive",
    "author_noarchive",
    "date_noarchive",
    "search_noarchive",
    "attachment_noarchive",
    "site_noarchive",
    "paged_noindex",
    "home_paged_noindex",
    "homepage_noindex",
    "homepage_nofollow",
    "homepage_noarchive",
    "homepage_tagline",
    "shortlink_tag",
    "prev_next_posts",
    "prev_next_archives",
    "prev_next_frontpage",
    "og_tags",
    "facebook_tags",
    "twitter_tags",
    "knowledge_output",
    "post_publish_time",
    "post_modify_time",
    "knowledge_logo",
    "ping_google",
    "ping_bing",
    "ping_yandex",
    "excerpt_the_feed",
    "source_the_feed",
    "ld_json_searchbox",
    "ld_json_breadcrumbs",
    "sitemaps_output",
    "sitemaps_robots",
    "sitemaps_modified",
    "sitemaps_priority",
    "sitemap_styles",
    "sitemap_logo",
];

/// Define every site rule and bind every site key under `bundle_key`
///
/// # Errors
///
/// Returns [`Error::InvalidRule`](crate::Error::InvalidRule) if a rule
/// definition is inconsistent.
pub fn register_site(registry: &mut Registry, bundle_key: &str) -> Result<()> {
    define_site_rules(registry)?;

    registry.register("title_separator", bundle_key, "title_separator");
    registry.register("description_separator", bundle_key, "description_separator");
    registry.register(
        "description",
        bundle_key,
        [
            "homepage_description",
            "homepage_og_description",
            "homepage_twitter_description",
        ],
    );
    registry.register("title", bundle_key, "knowledge_name");
    registry.register(
        "title",
        bundle_key,
        [
            "homepage_title",
            "homepage_title_tagline",
            "homepage_og_title",
            "homepage_twitter_title",
        ],
    );
    registry.register("knowledge_type", bundle_key, "knowledge_type");
    registry.register("left_right", bundle_key, "title_location");
    registry.register("left_right_home", bundle_key, "home_title_location");
    registry.register(
        "alter_query_type",
        bundle_key,
        ["alter_archive_query_type", "alter_search_query_type"],
    );
    registry.register("boolean", bundle_key, BOOLEAN_KEYS);
    registry.register(
        "absint",
        bundle_key,
        ["social_image_fb_id", "homepage_social_image_id", "knowledge_logo_id"],
    );
    registry.register("numeric_string", bundle_key, "timestamps_format");
    registry.register("disabled_post_types", bundle_key, "disabled_post_types");
    registry.register(
        "post_types",
        bundle_key,
        ROBOTS
            .iter()
            .map(|robot| robots_post_type_option_id(robot))
            .collect::<Vec<_>>(),
    );
    registry.register(
        "no_html_space",
        bundle_key,
        [
            "facebook_appid",
            "google_verification",
            "bing_verification",
            "yandex_verification",
            "pint_verification",
        ],
    );
    registry.register(
        "url",
        bundle_key,
        [
            "knowledge_facebook",
            "knowledge_twitter",
            "knowledge_gplus",
            "knowledge_instagram",
            "knowledge_youtube",
            "knowledge_pinterest",
            "knowledge_soundcloud",
            "knowledge_tumblr",
        ],
    );
    registry.register(
        "url_query",
        bundle_key,
        [
            "knowledge_linkedin",
            "social_image_fb_url",
            "homepage_social_image_url",
            "knowledge_logo_url",
        ],
    );
    registry.register("facebook_profile", bundle_key, ["facebook_publisher", "facebook_author"]);
    registry.register("twitter_name", bundle_key, ["twitter_site", "twitter_creator"]);
    registry.register("twitter_card", bundle_key, "twitter_card");
    registry.register("canonical_scheme", bundle_key, "canonical_scheme");
    registry.register("color_hex", bundle_key, ["sitemap_color_main", "sitemap_color_accent"]);
    registry.register("sitemap_query_limit", bundle_key, "sitemap_query_limit");

    Ok(())
}

/// Named rules used by the site catalog
///
/// # Errors
///
/// Returns [`Error::InvalidRule`](crate::Error::InvalidRule) if a rule
/// definition is inconsistent.
pub fn define_site_rules(registry: &mut Registry) -> Result<()> {
    registry.define_rule("title_separator", Rule::one_of(SEPARATORS.iter().copied()))?;
    registry.define_rule("description_separator", Rule::one_of(SEPARATORS.iter().copied()))?;
    registry.define_rule("description", Rule::description())?;
    registry.define_rule("title", Rule::title())?;
    registry.define_rule("excerpt", Rule::excerpt())?;
    registry.define_rule("knowledge_type", Rule::one_of(KNOWLEDGE_TYPES.iter().copied()))?;
    registry.define_rule("left_right", Rule::one_of(["left", "right"]))?;
    registry.define_rule("left_right_home", Rule::one_of(["left", "right"]))?;
    registry.define_rule("alter_query_type", Rule::one_of_or_default(QUERY_TYPES.iter().copied()))?;
    registry.define_rule("boolean", Rule::Boolean)?;
    registry.define_rule("absint", Rule::NonNegativeInt)?;
    registry.define_rule("numeric_string", Rule::NumericString)?;
    registry.define_rule(
        "disabled_post_types",
        Rule::disabled_post_types(FORCED_POST_TYPES.iter().copied()),
    )?;
    registry.define_rule("post_types", Rule::PostTypes)?;
    registry.define_rule("no_html", Rule::StripTags)?;
    registry.define_rule("no_html_space", Rule::StripTagsAndSpaces)?;
    registry.define_rule("url", Rule::Url)?;
    registry.define_rule("url_query", Rule::UrlQuery)?;
    registry.define_rule("facebook_profile", Rule::profile_url())?;
    registry.define_rule("twitter_name", Rule::SocialHandle)?;
    registry.define_rule("twitter_card", Rule::one_of(TWITTER_CARDS.iter().copied()))?;
    registry.define_rule(
        "canonical_scheme",
        Rule::one_of_or_default(CANONICAL_SCHEMES.iter().copied()),
    )?;
    registry.define_rule("color_hex", Rule::HexColor)?;
    registry.define_rule("sitemap_query_limit", Rule::clamp(1, 50000))?;
    Ok(())
}

/// Static defaults of the site bundle
#[must_use]
pub fn site_defaults(bundle_key: &str) -> StaticDefaults {
    StaticDefaults::new().with(bundle_key, default_site_settings())
}

fn default_site_settings() -> Value {
    let groups = [
        json!({
            "title_separator": "pipe",
            "title_seperator": "pipe",
            "description_separator": "pipe",
            "title_location": "right",
            "home_title_location": "left",
            "title_rem_additions": 0,
            "title_rem_prefixes": 0,
            "title_strip_tags": 1,
            "homepage_tagline": 1,
        }),
        json!({
            "knowledge_output": 1,
            "knowledge_type": "organization",
            "knowledge_logo": 1,
            "alter_search_query": 1,
            "alter_archive_query": 1,
            "alter_archive_query_type": "in_query",
            "alter_search_query_type": "in_query",
            "auto_description": 1,
            "description_additions": 1,
            "description_blogname": 1,
        }),
        json!({
            "display_seo_bar_tables": 1,
            "display_seo_bar_metabox": 0,
            "display_pixel_counter": 1,
            "display_character_counter": 1,
            "cache_meta_schema": 0,
            "cache_sitemap": 1,
            "cache_object": 1,
            "timestamps_format": "1",
        }),
        json!({
            "disabled_post_types": {},
            "noindex_post_types": {"attachment": 1},
            "nofollow_post_types": {},
            "noarchive_post_types": {},
            "search_noindex": 1,
            "attachment_noindex": 1,
            "paged_noindex": 1,
        }),
        json!({
            "og_tags": 1,
            "facebook_tags": 1,
            "twitter_tags": 1,
            "twitter_card": "summary_large_image",
            "canonical_scheme": "automatic",
            "post_publish_time": 1,
            "post_modify_time": 1,
            "ld_json_searchbox": 1,
            "ld_json_breadcrumbs": 1,
        }),
        json!({
            "sitemaps_output": 1,
            "sitemaps_robots": 1,
            "sitemaps_modified": 1,
            "sitemaps_priority": 1,
            "sitemap_styles": 1,
            "sitemap_logo": 1,
            "sitemap_color_main": "222",
            "sitemap_color_accent": "00cd98",
            "sitemap_query_limit": 3000,
        }),
        json!({
            "ping_google": 1,
            "ping_bing": 1,
            "ping_yandex": 0,
            "excerpt_the_feed": 1,
            "source_the_feed": 1,
            "shortlink_tag": 0,
            "prev_next_posts": 1,
            "prev_next_archives": 1,
            "prev_next_frontpage": 1,
        }),
    ];

    // Grouped to stay under the json! macro recursion limit
    let mut settings = Map::new();
    for group in groups {
        if let Value::Object(entries) = group {
            settings.extend(entries);
        }
    }
    Value::Object(settings)
}

/// Compatibility steps of the site bundle
///
/// Keeps the misspelled `title_seperator` and the per-directive attachment
/// flags in line with their current settings.
#[must_use]
pub fn site_migrator(bundle_key: &str) -> Migrator {
    ROBOTS.iter().fold(
        Migrator::new(bundle_key).mirror("title_separator", "title_seperator"),
        |migrator, robot| {
            migrator.flag_from_set(
                robots_post_type_option_id(robot),
                "attachment",
                format!("attachment_{robot}"),
            )
        },
    )
}
