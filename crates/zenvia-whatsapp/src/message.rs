//! Normalized message model
//!
//! Inbound webhook events are flattened into [`IncomingMessage`] values:
//! plain text carries the typed text, media messages carry a placeholder
//! pattern plus a resolved attachment. Outbound traffic is described by
//! [`Outgoing`] and turned into wire payloads elsewhere.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::webhook::MessageEvent;

/// Audio attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    /// Download URL
    pub url: String,
    /// Optional caption title
    pub title: Option<String>,
    /// Raw provider payload the attachment was built from
    pub metadata: Value,
}

impl Audio {
    /// Placeholder text identifying audio messages
    pub const PATTERN: &'static str = "%%%_AUDIO_%%%";

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            metadata: Value::Null,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Image attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Download URL
    pub url: String,
    /// Optional caption title
    pub title: Option<String>,
    /// Raw provider payload the attachment was built from
    pub metadata: Value,
}

impl Image {
    /// Placeholder text identifying image messages
    pub const PATTERN: &'static str = "%%%_IMAGE_%%%";

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            metadata: Value::Null,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Video attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Download URL
    pub url: String,
    /// Optional caption title
    pub title: Option<String>,
    /// Raw provider payload the attachment was built from
    pub metadata: Value,
}

impl Video {
    /// Placeholder text identifying video messages
    pub const PATTERN: &'static str = "%%%_VIDEO_%%%";

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            metadata: Value::Null,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Generic file attachment (documents, archives, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Download URL
    pub url: String,
    /// Optional caption title
    pub title: Option<String>,
    /// Raw provider payload the attachment was built from
    pub metadata: Value,
}

impl FileAttachment {
    /// Placeholder text identifying file messages
    pub const PATTERN: &'static str = "%%%_FILE_%%%";

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            metadata: Value::Null,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Shared contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub user_id: String,
    pub vcard: String,
}

impl Contact {
    /// Placeholder text identifying contact messages
    pub const PATTERN: &'static str = "%%%_CONTACT_%%%";

    pub fn new(
        phone_number: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            user_id: user_id.into(),
            vcard: String::new(),
        }
    }

    pub fn with_vcard(mut self, vcard: impl Into<String>) -> Self {
        self.vcard = vcard.into();
        self
    }
}

/// Geographic location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Placeholder text identifying location messages
    pub const PATTERN: &'static str = "%%%_LOCATION_%%%";

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Attachment of an outbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attachment {
    Audio(Audio),
    Image(Image),
    Video(Video),
    File(FileAttachment),
    Contact(Contact),
    Location(Location),
}

/// Normalized incoming message handed to the host application
///
/// `text` is either the typed message text or, for media events, the
/// placeholder pattern of the attachment type. Exactly one attachment
/// slot is populated per media message; the raw event stays available
/// for handler-specific extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Message text or attachment placeholder
    pub text: String,
    /// Sender id (the user talking to the channel)
    pub sender: String,
    /// Recipient id (the channel account, or the chat for media events)
    pub recipient: String,
    /// Raw message event this message was built from
    pub event: MessageEvent,
    /// Resolved audio attachments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio: Vec<Audio>,
    /// Resolved image attachments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    /// Resolved video attachments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub videos: Vec<Video>,
    /// Resolved file attachments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileAttachment>,
    /// Shared contact, when the message is a contact card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// Shared location, when the message is a pin drop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl IncomingMessage {
    pub fn new(
        text: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        event: MessageEvent,
    ) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            event,
            audio: Vec::new(),
            images: Vec::new(),
            videos: Vec::new(),
            files: Vec::new(),
            contact: None,
            location: None,
        }
    }

    pub fn with_audio(mut self, audio: Vec<Audio>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_images(mut self, images: Vec<Image>) -> Self {
        self.images = images;
        self
    }

    pub fn with_videos(mut self, videos: Vec<Video>) -> Self {
        self.videos = videos;
        self
    }

    pub fn with_files(mut self, files: Vec<FileAttachment>) -> Self {
        self.files = files;
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Outbound message with optional attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl OutgoingMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// One quick-reply button of a [`Question`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    /// Label shown to the user
    pub text: String,
    /// Reply token posted back when the button is tapped
    pub value: String,
}

impl Button {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Interactive question with quick-reply buttons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub buttons: Vec<Button>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Anything the channel can deliver
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// Plain text
    Text(String),
    /// Message with optional attachment
    Message(OutgoingMessage),
    /// Interactive question
    Question(Question),
}

impl From<&str> for Outgoing {
    fn from(text: &str) -> Self {
        Outgoing::Text(text.to_string())
    }
}

impl From<String> for Outgoing {
    fn from(text: String) -> Self {
        Outgoing::Text(text)
    }
}

impl From<OutgoingMessage> for Outgoing {
    fn from(message: OutgoingMessage) -> Self {
        Outgoing::Message(message)
    }
}

impl From<Question> for Outgoing {
    fn from(question: Question) -> Self {
        Outgoing::Question(question)
    }
}

/// Host-facing view of an incoming message as a conversation answer
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Answer value (the message text)
    pub text: String,
    /// Message the answer was derived from
    pub message: IncomingMessage,
}

/// Conversation peer profile
///
/// The provider exposes no profile lookup, so the names stay empty and
/// the id doubles as the username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            username: id.clone(),
            id,
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}
