//! Conversation envelope
//!
//! Serde model of the multi-agent conversation envelope the agent speaks:
//! inbound `utterance` / `getManifests` events, outbound `utterance` /
//! `publishManifests` events, plus the agent's capability manifest.

use crate::config::AgentConfig;
use crate::error::ResearchError;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "1.0.0";

pub const EVENT_UTTERANCE: &str = "utterance";
pub const EVENT_GET_MANIFESTS: &str = "getManifests";
pub const EVENT_PUBLISH_MANIFESTS: &str = "publishManifests";

//
// ================= Envelope =================
//

/// Top-level payload: `{ "openFloor": { ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "openFloor")]
    pub open_floor: Envelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub schema: Schema,
    pub conversation: Conversation,
    pub sender: Sender,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub speaker_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct To {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<To>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub parameters: Value,
}

//
// ================= Dialog events =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogEvent {
    pub speaker_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub features: Features,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFeature {
    pub mime_type: String,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
}

impl DialogEvent {
    pub fn text(speaker_uri: &str, text: &str) -> Self {
        Self {
            speaker_uri: speaker_uri.to_string(),
            id: Some(Uuid::new_v4().to_string()),
            features: Features {
                text: Some(TextFeature {
                    mime_type: "text/plain".to_string(),
                    tokens: vec![Token {
                        value: text.to_string(),
                    }],
                }),
            },
        }
    }

    /// Token values joined with a single space
    pub fn plain_text(&self) -> String {
        self.features
            .text
            .as_ref()
            .map(|t| {
                t.tokens
                    .iter()
                    .map(|tok| tok.value.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }
}

//
// ================= Manifest =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub identification: Identification,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub speaker_uri: String,
    pub service_url: String,
    pub organization: String,
    pub conversational_name: String,
    pub department: String,
    pub role: String,
    pub synopsis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub keyphrases: Vec<String>,
    pub descriptions: Vec<String>,
    pub languages: Vec<String>,
}

impl Manifest {
    pub fn for_agent(config: &AgentConfig) -> Self {
        Self {
            identification: Identification {
                speaker_uri: config.speaker_uri.clone(),
                service_url: config.service_url.clone(),
                organization: "SEC Research".to_string(),
                conversational_name: "SEC Research Agent".to_string(),
                department: "Financial Research".to_string(),
                role: "Public company filings analyst".to_string(),
                synopsis: "Looks up public companies and summarizes their recent SEC EDGAR filings."
                    .to_string(),
            },
            capabilities: vec![Capability {
                keyphrases: ["sec filings", "10-k", "10-q", "8-k", "company research", "ticker lookup", "edgar"]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
                descriptions: vec![
                    "Resolves company names to SEC CIK numbers and tickers".to_string(),
                    "Summarizes recent 10-K, 10-Q, 8-K and proxy filings".to_string(),
                ],
                languages: vec!["en-us".to_string()],
            }],
        }
    }
}

//
// ================= Behavior =================
//

impl Event {
    /// Events without a recipient are broadcast; otherwise the recipient's
    /// speaker URI or service URL must be ours.
    pub fn is_addressed_to(&self, speaker_uri: &str, service_url: &str) -> bool {
        match &self.to {
            None => true,
            Some(to) if to.speaker_uri.is_none() && to.service_url.is_none() => true,
            Some(to) => {
                to.speaker_uri.as_deref() == Some(speaker_uri)
                    || to.service_url.as_deref() == Some(service_url)
            }
        }
    }

    pub fn dialog_event(&self) -> Option<DialogEvent> {
        let value = self.parameters.get("dialogEvent")?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn utterance(to_speaker_uri: &str, dialog_event: DialogEvent) -> Self {
        Self {
            event_type: EVENT_UTTERANCE.to_string(),
            to: Some(To {
                speaker_uri: Some(to_speaker_uri.to_string()),
                ..Default::default()
            }),
            reason: None,
            parameters: serde_json::json!({ "dialogEvent": dialog_event }),
        }
    }

    pub fn publish_manifests(to_speaker_uri: &str, manifest: &Manifest) -> Self {
        Self {
            event_type: EVENT_PUBLISH_MANIFESTS.to_string(),
            to: Some(To {
                speaker_uri: Some(to_speaker_uri.to_string()),
                ..Default::default()
            }),
            reason: None,
            parameters: serde_json::json!({
                "servicingManifests": [manifest],
                "discoveryManifests": [],
            }),
        }
    }
}

impl Envelope {
    /// Reply envelope in the same conversation, sent by this agent.
    pub fn reply(&self, speaker_uri: &str, service_url: &str, events: Vec<Event>) -> Self {
        Self {
            schema: Schema {
                version: SCHEMA_VERSION.to_string(),
                url: None,
            },
            conversation: self.conversation.clone(),
            sender: Sender {
                speaker_uri: speaker_uri.to_string(),
                service_url: Some(service_url.to_string()),
            },
            events,
        }
    }

    /// Structural checks the deserializer cannot express
    pub fn validate(&self) -> Result<()> {
        if self.schema.version.trim().is_empty() {
            return Err(ResearchError::Envelope("schema version is empty".into()));
        }
        if self.conversation.id.trim().is_empty() {
            return Err(ResearchError::Envelope("conversation id is empty".into()));
        }
        if self.sender.speaker_uri.trim().is_empty() {
            return Err(ResearchError::Envelope("sender speakerUri is empty".into()));
        }
        for (i, event) in self.events.iter().enumerate() {
            if event.event_type.trim().is_empty() {
                return Err(ResearchError::Envelope(format!("event {} has no eventType", i)));
            }
            if event.event_type == EVENT_UTTERANCE && event.dialog_event().is_none() {
                return Err(ResearchError::Envelope(format!(
                    "utterance event {} has no valid dialogEvent",
                    i
                )));
            }
        }
        Ok(())
    }
}
