//! Sponsorship outreach workflow
//!
//! ```text
//! collect_data → draft_mail → search_companies → confirm_mail ─┬─ yes ──→ send_mail → END
//!                    ↑                                         ├─ no ───┐
//!                    └─────────────────────────────────────────┼────────┘
//!                                                              └─ abort → END
//! ```
//!
//! A rejected draft loops back to `draft_mail`; the loop is bounded by the
//! graph's step limit. Once `error` is set the confirmation router aborts
//! instead of looping.

use crate::collaborators::{Confirmer, LanguageModel, Mailer, OutgoingMail, SponsorDirectory};
use crate::prompts;
use crate::support::{has_error, message, no_change, str_field};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::{Arc, LazyLock};
use stepflow_core::{CompiledGraph, MergeClass, NodeError, Result, StateGraph, StateSchema, END};
use tracing::{info, warn};

/// Registry name of the workflow
pub const SPONSORSHIP: &str = "sponsorship";

pub const MAIL_SUBJECT: &str = "Sponsorship Inquiry";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\.-]+@[\w\.-]+").expect("valid email pattern"));

/// Influencer details used when the run input leaves them out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluencerProfile {
    pub niche: Option<String>,
    pub youtube_subscribers: Option<u64>,
    pub insta_followers: Option<u64>,
    pub linkedin_followers: Option<u64>,
    pub youtube_url: Option<String>,
    pub insta_url: Option<String>,
    pub linkedin_url: Option<String>,
}

impl InfluencerProfile {
    fn as_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Collaborators used by the sponsorship workflow
#[derive(Clone)]
pub struct SponsorshipServices {
    pub model: Arc<dyn LanguageModel>,
    pub directory: Arc<dyn SponsorDirectory>,
    pub confirmer: Arc<dyn Confirmer>,
    pub mailer: Arc<dyn Mailer>,
}

/// Builder for the sponsorship graph
pub struct SponsorshipWorkflow {
    services: SponsorshipServices,
    profile: InfluencerProfile,
}

struct Context {
    services: SponsorshipServices,
    profile: InfluencerProfile,
}

impl SponsorshipWorkflow {
    pub fn new(services: SponsorshipServices) -> Self {
        Self {
            services,
            profile: InfluencerProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: InfluencerProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn schema() -> StateSchema {
        let mut schema = StateSchema::new();
        schema.add_field("messages", MergeClass::Append);
        for field in [
            "niche",
            "youtube_subscribers",
            "insta_followers",
            "linkedin_followers",
            "youtube_url",
            "insta_url",
            "linkedin_url",
            "drafted_mail",
            "companies_found",
            "confirmation",
        ] {
            schema.add_field_with_default(field, MergeClass::Overwrite, Value::Null);
        }
        schema
    }

    pub fn build(self) -> Result<CompiledGraph> {
        let ctx = Arc::new(Context {
            services: self.services,
            profile: self.profile,
        });

        let mut graph = StateGraph::new(Self::schema());

        let c = ctx.clone();
        graph.add_node("collect_data", move |state| {
            let c = c.clone();
            async move { collect_data(&c.profile, state) }
        });
        let c = ctx.clone();
        graph.add_node("draft_mail", move |state| draft_mail(c.clone(), state));
        let c = ctx.clone();
        graph.add_node("search_companies", move |state| search_companies(c.clone(), state));
        let c = ctx.clone();
        graph.add_node("confirm_mail", move |state| confirm_mail(c.clone(), state));
        let c = ctx;
        graph.add_node("send_mail", move |state| send_mail(c.clone(), state));

        graph.set_entry("collect_data");
        graph.add_edge("collect_data", "draft_mail");
        graph.add_edge("draft_mail", "search_companies");
        graph.add_edge("search_companies", "confirm_mail");
        graph.add_conditional_edges(
            "confirm_mail",
            route_confirmation,
            [("yes", "send_mail"), ("no", "draft_mail"), ("abort", END)],
        );
        graph.add_edge("send_mail", END);

        graph.compile()
    }
}

fn route_confirmation(state: &Value) -> String {
    if has_error(state) {
        "abort".to_string()
    } else if str_field(state, "confirmation") == "yes" {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

fn collect_data(profile: &InfluencerProfile, state: Value) -> std::result::Result<Value, NodeError> {
    let mut delta = Map::new();
    for (name, value) in profile.as_fields() {
        let missing = state.get(&name).map_or(true, Value::is_null);
        if missing && !value.is_null() {
            delta.insert(name, value);
        }
    }

    let niche_known = delta.contains_key("niche") || !str_field(&state, "niche").is_empty();
    if !niche_known {
        return Err(NodeError::new("No influencer niche provided."));
    }

    info!(filled = delta.len(), "Influencer data collected");
    Ok(Value::Object(delta))
}

async fn draft_mail(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let draft = ctx
        .services
        .model
        .complete(&prompts::sponsorship_mail(&state))
        .await?;
    info!("Sponsorship mail drafted");
    Ok(json!({"drafted_mail": draft}))
}

async fn search_companies(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let contacts = ctx.services.directory.marketing_contacts().await?;
    Ok(json!({"companies_found": format_contacts(&contacts)}))
}

fn format_contacts(contacts: &[String]) -> String {
    if contacts.is_empty() {
        return "No recipients found.".to_string();
    }
    let lines: Vec<String> = contacts.iter().map(|c| format!("- {c}")).collect();
    format!("Found {} potential sponsors:\n{}", contacts.len(), lines.join("\n"))
}

async fn confirm_mail(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let approved = ctx
        .services
        .confirmer
        .confirm(str_field(&state, "drafted_mail"))
        .await?;
    info!(approved, "Draft reviewed");
    Ok(json!({"confirmation": if approved { "yes" } else { "no" }}))
}

/// Addresses mentioned in free text, in order of appearance
pub fn extract_recipients(text: &str) -> Vec<String> {
    EMAIL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

async fn send_mail(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let recipients = extract_recipients(str_field(&state, "companies_found"));
    if recipients.is_empty() {
        warn!("No email addresses to send to");
        return Ok(json!({
            "messages": [message("human", "Agent completed. No emails were found, so no messages were sent.")]
        }));
    }

    let mail = OutgoingMail {
        subject: MAIL_SUBJECT.to_string(),
        body: str_field(&state, "drafted_mail").to_string(),
        recipients,
    };
    ctx.services.mailer.send(&mail).await?;
    info!(count = mail.recipients.len(), "Sponsorship mails sent");

    Ok(json!({"messages": [message("human", "Emails have been sent.")]}))
}
