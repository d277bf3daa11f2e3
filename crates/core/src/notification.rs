//! Validation and decoding for inbound wallet notification payloads.
//!
//! The upstream system posts events of shape `{type, event, <payload>}`.
//! Template payloads arrive as a doubly-nested JSON envelope: the revision
//! object carries a `serializedSnapshot` JSON *string*, whose decoded
//! `objectData` field is itself a JSON string holding the actual template
//! document. That quirk is part of the wire contract and preserved here.

use std::str::FromStr;

use serde_json::{Map, Value};

/// Recognized notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    DdaTemplate,
    DdaRecord,
    B2bConnection,
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dda_template" => Ok(NotificationType::DdaTemplate),
            "dda_record" => Ok(NotificationType::DdaRecord),
            "b2b_connection" => Ok(NotificationType::B2bConnection),
            other => Err(format!("unrecognized notification type '{other}'")),
        }
    }
}

/// Recognized notification events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    Create,
    Update,
    Delete,
}

impl FromStr for NotificationEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(NotificationEvent::Create),
            "update" => Ok(NotificationEvent::Update),
            "delete" => Ok(NotificationEvent::Delete),
            other => Err(format!("unrecognized notification event '{other}'")),
        }
    }
}

/// Fields that must be present and non-empty in a decoded template
/// document for create/update events.
pub const REQUIRED_TEMPLATE_FIELDS: [&str; 10] = [
    "@id",
    "version",
    "language",
    "dataController",
    "agreementPeriod",
    "dataSharingRestrictions",
    "purpose",
    "purposeDescription",
    "lawfulBasis",
    "codeOfConduct",
];

/// A decoded template notification payload.
#[derive(Debug, Clone)]
pub struct TemplateEnvelope {
    /// The fully decoded template document.
    pub template: Map<String, Value>,
    /// The raw revision object as received (stored verbatim for audit).
    pub revision: Map<String, Value>,
    /// The upstream revision id, when present.
    pub revision_id: Option<String>,
}

impl TemplateEnvelope {
    /// The stable logical template id (`@id`).
    pub fn template_id(&self) -> Option<&str> {
        self.template.get("@id").and_then(Value::as_str)
    }

    /// The caller-supplied version string. Not required to be comparable.
    pub fn version(&self) -> &str {
        self.template
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Decode the doubly-nested template envelope from a revision object.
///
/// Fails with a human-readable description when the envelope is missing
/// a layer or a layer is not valid JSON.
pub fn decode_template_envelope(revision: &Value) -> Result<TemplateEnvelope, String> {
    let revision_obj = revision
        .as_object()
        .ok_or_else(|| "'dataDisclosureAgreementTemplate' must be an object".to_string())?;

    let snapshot_raw = revision_obj
        .get("serializedSnapshot")
        .and_then(Value::as_str)
        .ok_or_else(|| "'serializedSnapshot' is required and must be a JSON string".to_string())?;

    let snapshot: Value = serde_json::from_str(snapshot_raw)
        .map_err(|e| format!("'serializedSnapshot' is not valid JSON: {e}"))?;

    let object_data_raw = snapshot
        .get("objectData")
        .and_then(Value::as_str)
        .ok_or_else(|| "'objectData' is required inside 'serializedSnapshot'".to_string())?;

    let template: Map<String, Value> = serde_json::from_str(object_data_raw)
        .map_err(|e| format!("'objectData' is not a valid JSON object: {e}"))?;

    let revision_id = revision_obj
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Ok(TemplateEnvelope {
        template,
        revision: revision_obj.clone(),
        revision_id,
    })
}

/// List the required fields missing from a decoded template document.
///
/// Create/update events require the full field set; delete only needs
/// `@id`. A field counts as missing when absent, null, or empty-string.
pub fn missing_template_fields(
    event: NotificationEvent,
    template: &Map<String, Value>,
) -> Vec<String> {
    let required: &[&str] = match event {
        NotificationEvent::Create | NotificationEvent::Update => &REQUIRED_TEMPLATE_FIELDS,
        NotificationEvent::Delete => &["@id"],
    };
    required
        .iter()
        .filter(|key| {
            match template.get(**key) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            }
        })
        .map(|key| key.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope_for(template: Value) -> Value {
        let object_data = serde_json::to_string(&template).unwrap();
        let snapshot = serde_json::to_string(&json!({ "objectData": object_data })).unwrap();
        json!({ "id": "rev-1", "serializedSnapshot": snapshot })
    }

    fn full_template() -> Value {
        json!({
            "@id": "tpl-1",
            "version": "1.0.0",
            "language": "en",
            "dataController": { "name": "Acme" },
            "agreementPeriod": 365,
            "dataSharingRestrictions": { "policyUrl": "https://acme.example" },
            "purpose": "research",
            "purposeDescription": "clinical research",
            "lawfulBasis": "consent",
            "codeOfConduct": "https://acme.example/coc"
        })
    }

    #[test]
    fn decodes_doubly_nested_envelope() {
        let env = decode_template_envelope(&envelope_for(full_template())).unwrap();
        assert_eq!(env.template_id(), Some("tpl-1"));
        assert_eq!(env.version(), "1.0.0");
        assert_eq!(env.revision_id.as_deref(), Some("rev-1"));
    }

    #[test]
    fn rejects_missing_snapshot() {
        let err = decode_template_envelope(&json!({ "id": "rev-1" })).unwrap_err();
        assert!(err.contains("serializedSnapshot"));
    }

    #[test]
    fn rejects_garbage_object_data() {
        let snapshot = serde_json::to_string(&json!({ "objectData": "{not json" })).unwrap();
        let err =
            decode_template_envelope(&json!({ "serializedSnapshot": snapshot })).unwrap_err();
        assert!(err.contains("objectData"));
    }

    #[test]
    fn reports_exact_missing_fields() {
        let mut template = full_template();
        template.as_object_mut().unwrap().remove("purpose");
        template["lawfulBasis"] = Value::Null;
        template["language"] = json!("");

        let env = decode_template_envelope(&envelope_for(template)).unwrap();
        let missing = missing_template_fields(NotificationEvent::Create, &env.template);
        assert_eq!(missing, vec!["language", "purpose", "lawfulBasis"]);
    }

    #[test]
    fn delete_only_requires_id() {
        let env = decode_template_envelope(&envelope_for(json!({ "@id": "tpl-1" }))).unwrap();
        assert!(missing_template_fields(NotificationEvent::Delete, &env.template).is_empty());

        let env = decode_template_envelope(&envelope_for(json!({ "version": "2" }))).unwrap();
        assert_eq!(
            missing_template_fields(NotificationEvent::Delete, &env.template),
            vec!["@id"]
        );
    }

    #[test]
    fn parses_types_and_events() {
        assert_eq!(
            "dda_template".parse::<NotificationType>().unwrap(),
            NotificationType::DdaTemplate
        );
        assert!("dda_templates".parse::<NotificationType>().is_err());
        assert_eq!(
            "delete".parse::<NotificationEvent>().unwrap(),
            NotificationEvent::Delete
        );
        assert!("remove".parse::<NotificationEvent>().is_err());
    }
}
