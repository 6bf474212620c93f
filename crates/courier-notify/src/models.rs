//! Wire models for inbound notification batches and outbound events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of change a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Created,
    Updated,
    Deleted,
}

/// Identifier block for the remote resource that changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceData {
    /// OData type tag, e.g. `#Microsoft.Graph.chatMessage`.
    #[serde(rename = "@odata.type")]
    pub odata_type: Option<String>,

    /// OData id of the changed resource.
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,

    /// Plain resource id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Inline encrypted payload attached to confidential notifications.
///
/// `data` is the symmetric ciphertext of the resource payload, `data_key`
/// the asymmetrically wrapped symmetric key, and `data_signature` a keyed
/// signature over the ciphertext. All three are base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedContent {
    pub data: String,
    pub data_signature: String,
    pub data_key: String,

    /// Certificate id the publisher encrypted against. Informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_certificate_id: Option<String>,

    /// Certificate thumbprint. Informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_certificate_thumbprint: Option<String>,
}

/// One entry of an inbound notification batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Subscription the change was observed under.
    pub subscription_id: String,

    /// Expiry of that subscription. Carried on the wire, unused here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_expiration_date_time: Option<DateTime<Utc>>,

    /// Shared secret negotiated at subscription time; must match the
    /// configured process-wide secret for the notification to be trusted.
    #[serde(default)]
    pub client_state: String,

    pub change_type: ChangeType,

    /// Path of the changed resource, used for enrichment fetches.
    #[serde(default)]
    pub resource: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_data: Option<ResourceData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<EncryptedContent>,
}

/// Inbound webhook body: notifications plus optional validation tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBatch {
    #[serde(default)]
    pub value: Vec<Notification>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_tokens: Option<Vec<String>>,
}

/// Normalized event published to a subscriber channel.
///
/// Ephemeral: constructed and immediately published, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchEvent {
    /// Channel key — the subscription id the notification belonged to.
    pub subscription_id: String,

    /// Resource-kind tag (`chatMessage`, `user`, ...) or the generic
    /// `notification` tag for notify-only changes.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Decrypted payload, enrichment projection, or `{}`.
    pub resource: serde_json::Value,
}

/// Event tag for notify-only dispatches (non-creation plain changes).
pub const GENERIC_EVENT_TAG: &str = "notification";

/// Normalize an OData type tag into a plain resource-kind tag.
///
/// `#Microsoft.Graph.chatMessage` and `#microsoft.graph.chatMessage` both
/// become `chatMessage`; tags without the namespace prefix pass through.
#[must_use]
pub fn resource_kind(odata_type: &str) -> &str {
    let stripped = odata_type.strip_prefix('#').unwrap_or(odata_type);
    stripped
        .rsplit_once('.')
        .map_or(stripped, |(_, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_kind_strips_namespace() {
        assert_eq!(resource_kind("#Microsoft.Graph.chatMessage"), "chatMessage");
        assert_eq!(resource_kind("#microsoft.graph.user"), "user");
        assert_eq!(resource_kind("chatMessage"), "chatMessage");
    }

    #[test]
    fn batch_deserializes_wire_shape() {
        let body = r##"{
            "value": [
                {
                    "subscriptionId": "sub-1",
                    "subscriptionExpirationDateTime": "2026-01-01T00:00:00Z",
                    "clientState": "secret",
                    "changeType": "created",
                    "resource": "Users/42/chats",
                    "resourceData": {
                        "@odata.type": "#Microsoft.Graph.chatMessage",
                        "@odata.id": "Users/42/chats('1')",
                        "id": "1"
                    }
                }
            ],
            "validationTokens": ["tok-a", "tok-b"]
        }"##;

        let batch: NotificationBatch = serde_json::from_str(body).unwrap();
        assert_eq!(batch.value.len(), 1);
        assert_eq!(batch.validation_tokens.as_ref().unwrap().len(), 2);

        let n = &batch.value[0];
        assert_eq!(n.subscription_id, "sub-1");
        assert_eq!(n.change_type, ChangeType::Created);
        assert_eq!(
            n.resource_data.as_ref().unwrap().odata_type.as_deref(),
            Some("#Microsoft.Graph.chatMessage")
        );
        assert!(n.encrypted_content.is_none());
    }

    #[test]
    fn batch_tolerates_missing_optionals() {
        let body = r#"{
            "value": [
                {
                    "subscriptionId": "sub-2",
                    "changeType": "deleted"
                }
            ]
        }"#;

        let batch: NotificationBatch = serde_json::from_str(body).unwrap();
        let n = &batch.value[0];
        assert!(batch.validation_tokens.is_none());
        assert_eq!(n.client_state, "");
        assert_eq!(n.resource, "");
    }

    #[test]
    fn dispatch_event_serializes_type_tag() {
        let event = DispatchEvent {
            subscription_id: "sub-1".to_string(),
            event_type: "chatMessage".to_string(),
            resource: serde_json::json!({}),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "chatMessage");
        assert_eq!(json["subscriptionId"], "sub-1");
    }
}
