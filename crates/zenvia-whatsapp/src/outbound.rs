//! Outbound payload building
//!
//! Turns an [`Outgoing`] message into the JSON document the message API
//! expects: a parameter map with `from`/`to` addressing and a `contents`
//! sequence holding exactly one content object per send.

use serde_json::{Map, Value, json};

use crate::config::ZenviaConfig;
use crate::message::{Attachment, IncomingMessage, Outgoing, OutgoingMessage, Question};

/// Questions with more buttons than this are rendered as list pickers.
const MAX_QUICK_REPLY_BUTTONS: usize = 3;
/// Label of the button that opens a list picker.
const LIST_BUTTON_LABEL: &str = "Open";
/// Title of the single section inside a list picker.
const LIST_SECTION_TITLE: &str = "Select";

/// Build the wire payload for an outgoing message.
///
/// Addressing answers the matching inbound message: `from` is its
/// recipient and `to` its sender. When exactly one of the two is empty,
/// the non-empty id is used for both sides. The parameter map starts
/// from the configured defaults, deep-merged with `extra` (per-call
/// values win), and `from`/`to` override whatever the merge produced.
pub fn build_payload(
    config: &ZenviaConfig,
    outgoing: &Outgoing,
    matching: &IncomingMessage,
    extra: Value,
) -> Value {
    let recipient = if matching.recipient.is_empty() {
        matching.sender.clone()
    } else {
        matching.recipient.clone()
    };
    let sender = if matching.sender.is_empty() {
        matching.recipient.clone()
    } else {
        matching.sender.clone()
    };

    let mut params = Value::Object(object_or_empty(
        config.default_additional_parameters.clone(),
    ));
    deep_merge(&mut params, Value::Object(object_or_empty(extra)));

    let content = content_for(outgoing, &params);

    params["from"] = Value::String(recipient);
    params["to"] = Value::String(sender);
    match &mut params["contents"] {
        Value::Array(contents) => contents.push(content),
        slot => *slot = Value::Array(vec![content]),
    }
    params
}

/// Merge `overlay` into `base`. Objects merge key-by-key recursively;
/// any other overlay value replaces the base value.
pub(crate) fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                deep_merge(base_map.entry(key).or_insert(Value::Null), value);
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

fn object_or_empty(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn content_for(outgoing: &Outgoing, params: &Value) -> Value {
    match outgoing {
        Outgoing::Text(text) => json!({"type": "text", "text": text}),
        Outgoing::Question(question) => question_content(question),
        Outgoing::Message(message) => match &message.attachment {
            None => json!({"type": "text", "text": message.text}),
            Some(attachment) => attachment_content(message, attachment, params),
        },
    }
}

fn question_content(question: &Question) -> Value {
    let rows: Vec<Value> = question
        .buttons
        .iter()
        .map(|button| json!({"id": button.value, "title": button.text}))
        .collect();

    if rows.len() > MAX_QUICK_REPLY_BUTTONS {
        json!({
            "type": "list",
            "body": question.text,
            "button": LIST_BUTTON_LABEL,
            "sections": [{"title": LIST_SECTION_TITLE, "rows": rows}],
        })
    } else {
        json!({
            "type": "button",
            "body": question.text,
            "buttons": rows,
        })
    }
}

fn attachment_content(message: &OutgoingMessage, attachment: &Attachment, params: &Value) -> Value {
    match attachment {
        Attachment::Audio(audio) => file_content(&audio.url, audio.title.as_deref(), &message.text),
        Attachment::Image(image) => file_content(&image.url, image.title.as_deref(), &message.text),
        Attachment::Video(video) => file_content(&video.url, video.title.as_deref(), &message.text),
        Attachment::File(file) => file_content(&file.url, file.title.as_deref(), &message.text),
        Attachment::Location(location) => {
            let mut content = json!({
                "type": "location",
                "latitude": location.latitude,
                "longitude": location.longitude,
            });
            // name/address/url ride along in the merged parameters
            for key in ["name", "address", "url"] {
                if let Some(value) = params.get(key) {
                    content[key] = value.clone();
                }
            }
            content
        }
        // The API has no contact content; fall back to plain text.
        Attachment::Contact(_) => json!({"type": "text", "text": message.text}),
    }
}

fn file_content(url: &str, title: Option<&str>, text: &str) -> Value {
    json!({
        "type": "file",
        "fileUrl": url,
        "fileCaption": title.unwrap_or(text),
    })
}
