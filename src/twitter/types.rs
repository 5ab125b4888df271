use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestTokenResponse {
    pub guest_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetResultVariables {
    pub tweet_id: String,
    pub with_community: bool,
    pub include_promoted_content: bool,
    pub with_voice: bool,
}

impl TweetResultVariables {
    pub fn new(tweet_id: &str) -> Self {
        Self {
            tweet_id: tweet_id.to_string(),
            with_community: false,
            include_promoted_content: false,
            with_voice: false,
        }
    }
}

/// Feature switches the web client sends with `TweetResultByRestId`
pub const TWEET_RESULT_FEATURES: &[(&str, bool)] = &[
    ("creator_subscriptions_quote_tweet_preview_enabled", false),
    ("communities_web_enable_tweet_community_results_fetch", false),
    ("c9s_tweet_anatomy_moderator_badge_enabled", false),
    ("articles_preview_enabled", true),
    ("tweetypie_unmention_optimization_enabled", true),
    ("responsive_web_edit_tweet_api_enabled", true),
    ("graphql_is_translatable_rweb_tweet_is_translatable_enabled", true),
    ("view_counts_everywhere_api_enabled", true),
    ("longform_notetweets_consumption_enabled", true),
    ("responsive_web_twitter_article_tweet_consumption_enabled", false),
    ("tweet_awards_web_tipping_enabled", false),
    ("freedom_of_speech_not_reach_fetch_enabled", true),
    ("standardized_nudges_misinfo", true),
    ("tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled", true),
    ("longform_notetweets_rich_text_read_enabled", true),
    ("longform_notetweets_inline_media_enabled", true),
    ("responsive_web_graphql_exclude_directive_enabled", true),
    ("verified_phone_label_enabled", false),
    ("responsive_web_graphql_skip_user_profile_image_extensions_enabled", false),
    ("responsive_web_graphql_timeline_navigation_enabled", true),
    ("responsive_web_enhance_cards_enabled", false),
];

pub fn features_json() -> serde_json::Value {
    serde_json::Value::Object(
        TWEET_RESULT_FEATURES
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::Bool(*v)))
            .collect(),
    )
}
