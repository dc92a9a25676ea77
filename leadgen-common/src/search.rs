//! Search query models and outbound payload formatting
//!
//! Two inbound shapes exist:
//! - [`SearchQuery`]: the people-search form posted to `/api/search`, validated
//!   field by field and forwarded to Discord as an embed.
//! - [`LeadSearch`]: the lead-search form submitted by the client, converted
//!   into a [`ClayPayload`] for the enrichment API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::time;

/// Embed colour for people-search notifications (brown)
pub const SEARCH_EMBED_COLOR: u32 = 8_531_219;

/// Embed colour for lead-search notifications (blue)
pub const LEAD_EMBED_COLOR: u32 = 3_447_003;

/// Placeholder used when a value is missing or blank
pub const NOT_SPECIFIED: &str = "Not specified";

const DEFAULT_COMPANY_SIZE: &str = "Any";
const DEFAULT_RESULTS_LIMIT: u32 = 100;

// ============================================================================
// People search (/api/search)
// ============================================================================

/// People-search filters; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    // Personal details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_phone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_social_profiles: Option<bool>,

    // Professional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publicly_traded: Option<bool>,

    // Advanced filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recently_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_profiles: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Flag,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Flag => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Flag => value.is_boolean(),
        }
    }
}

/// Wire names of [`SearchQuery`] fields, in form order
const SEARCH_FIELDS: &[(&str, FieldKind)] = &[
    ("personName", FieldKind::Text),
    ("location", FieldKind::Text),
    ("hasEmail", FieldKind::Flag),
    ("hasPhone", FieldKind::Flag),
    ("hasSocialProfiles", FieldKind::Flag),
    ("jobTitle", FieldKind::Text),
    ("companyName", FieldKind::Text),
    ("companySize", FieldKind::Text),
    ("industry", FieldKind::Text),
    ("currentRole", FieldKind::Flag),
    ("publiclyTraded", FieldKind::Flag),
    ("yearsOfExperience", FieldKind::Text),
    ("educationLevel", FieldKind::Text),
    ("skills", FieldKind::Text),
    ("recentlyActive", FieldKind::Flag),
    ("verifiedProfiles", FieldKind::Flag),
];

/// One field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub code: String,
    pub expected: String,
    pub received: String,
    pub path: Vec<String>,
    pub message: String,
}

impl FieldError {
    fn invalid_type(path: Vec<String>, expected: &str, value: &Value) -> Self {
        let received = json_type_name(value);
        Self {
            code: "invalid_type".to_string(),
            expected: expected.to_string(),
            received: received.to_string(),
            path,
            message: format!("Expected {}, received {}", expected, received),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl SearchQuery {
    /// Validate an untyped request body
    ///
    /// Unknown keys are dropped. Every known key that is present must have
    /// the right JSON type; all mismatches are reported together.
    pub fn validate(body: &Value) -> Result<Self, Vec<FieldError>> {
        let object = match body {
            Value::Object(map) => map,
            other => return Err(vec![FieldError::invalid_type(Vec::new(), "object", other)]),
        };

        let mut known = Map::new();
        let mut errors = Vec::new();

        for (name, kind) in SEARCH_FIELDS {
            if let Some(value) = object.get(*name) {
                if kind.accepts(value) {
                    known.insert((*name).to_string(), value.clone());
                } else {
                    errors.push(FieldError::invalid_type(
                        vec![(*name).to_string()],
                        kind.expected(),
                        value,
                    ));
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        serde_json::from_value(Value::Object(known)).map_err(|e| {
            vec![FieldError {
                code: "custom".to_string(),
                expected: "object".to_string(),
                received: "object".to_string(),
                path: Vec::new(),
                message: e.to_string(),
            }]
        })
    }

    /// Present fields as (label, display value) pairs in form order
    pub fn display_fields(&self) -> Vec<(String, String)> {
        let Ok(Value::Object(map)) = serde_json::to_value(self) else {
            return Vec::new();
        };

        map.iter()
            .map(|(key, value)| {
                let shown = match value {
                    Value::Bool(true) => "Yes".to_string(),
                    Value::Bool(false) => "No".to_string(),
                    Value::String(s) if s.is_empty() => NOT_SPECIFIED.to_string(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (format_label(key), shown)
            })
            .collect()
    }

    /// Discord message announcing this query
    pub fn to_discord_message(&self, at: DateTime<Utc>) -> DiscordMessage {
        let fields = self
            .display_fields()
            .into_iter()
            .map(|(name, value)| EmbedField {
                name,
                value,
                inline: true,
            })
            .collect();

        DiscordMessage {
            content: "New search query from ArchiVintage:".to_string(),
            embeds: vec![DiscordEmbed {
                title: "People Search Query".to_string(),
                color: SEARCH_EMBED_COLOR,
                fields,
                footer: Some(EmbedFooter {
                    text: "ArchiVintage People Search".to_string(),
                }),
                timestamp: time::to_iso(&at),
            }],
        }
    }
}

/// `personName` -> `Person Name`
pub fn format_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_ascii_uppercase() {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    label
}

// ============================================================================
// Discord webhook payload
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordMessage {
    pub content: String,
    pub embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordEmbed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

// ============================================================================
// Lead search (client form -> enrichment API)
// ============================================================================

/// Lead-search form as filled in by the user
///
/// Country and region arrive as display names; resolving codes to names is
/// the form's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSearch {
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_keywords: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub job_levels: Vec<String>,
    #[serde(default)]
    pub job_titles: Vec<String>,
    #[serde(default)]
    pub results_limit: Option<u32>,
}

/// Body sent to the enrichment API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClayPayload {
    pub company_size: String,
    pub industry: String,
    pub company_keywords: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub job_levels: Vec<String>,
    pub job_titles: Vec<String>,
    pub results_limit: u32,
    pub timestamp: String,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl ClayPayload {
    pub fn from_search(search: &LeadSearch, at: DateTime<Utc>) -> Self {
        let country = non_blank(&search.country);
        // A region only means something inside a country
        let region = country.and(non_blank(&search.region));

        Self {
            company_size: non_blank(&search.company_size)
                .unwrap_or(DEFAULT_COMPANY_SIZE)
                .to_string(),
            industry: non_blank(&search.industry).unwrap_or_default().to_string(),
            company_keywords: non_blank(&search.company_keywords)
                .unwrap_or_default()
                .to_string(),
            country: country.unwrap_or(NOT_SPECIFIED).to_string(),
            region: region.unwrap_or(NOT_SPECIFIED).to_string(),
            city: non_blank(&search.city).unwrap_or_default().to_string(),
            job_levels: search.job_levels.clone(),
            job_titles: search.job_titles.clone(),
            results_limit: search
                .results_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_RESULTS_LIMIT),
            timestamp: time::to_iso(&at),
        }
    }

    /// Discord message logging this payload
    pub fn to_discord_message(&self, at: DateTime<Utc>) -> DiscordMessage {
        let fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .map(|(name, value)| EmbedField {
                    name,
                    value: match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    },
                    inline: true,
                })
                .collect(),
            _ => Vec::new(),
        };

        DiscordMessage {
            content: "New lead search query:".to_string(),
            embeds: vec![DiscordEmbed {
                title: "Lead Search Query".to_string(),
                color: LEAD_EMBED_COLOR,
                fields,
                footer: None,
                timestamp: time::to_iso(&at),
            }],
        }
    }
}

/// Sample body for a manual delivery test
pub fn test_payload(at: DateTime<Utc>) -> Value {
    json!({
        "companySize": "51-200",
        "industry": "Technology",
        "companyKeywords": "SaaS, B2B, startup",
        "country": "United States",
        "region": "California",
        "city": "San Francisco",
        "jobLevels": ["c_level", "vp"],
        "jobTitles": ["ceo", "cto", "vp_sales"],
        "resultsLimit": 100,
        "timestamp": time::to_iso(&at),
    })
}
