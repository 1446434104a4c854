//! In-memory data behind the stand-in API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const RESOURCE_ROOT: &str = "https://api.context.io/lite";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OAuthProvider {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub provider_consumer_key: String,
    pub provider_consumer_secret: String,
    pub resource_url: String,
}

#[derive(Clone, Debug)]
pub struct BodyContent {
    pub content_type: String,
    pub charset: String,
    pub content: String,
}

#[derive(Clone, Debug)]
pub struct StoredMessage {
    pub email_message_id: String,
    pub subject: String,
    pub from: (String, String),
    /// Kept as raw JSON so the service quirk (`[]` when empty) is preserved.
    pub person_info: Value,
    pub sent_at: i64,
    pub bodies: Vec<BodyContent>,
}

#[derive(Clone, Debug, Default)]
pub struct Account {
    pub folders: BTreeMap<String, Vec<StoredMessage>>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub providers: BTreeMap<String, OAuthProvider>,
    pub accounts: BTreeMap<(String, String), Account>,
}

impl Store {
    /// One account, `u1` / `acct`, with an `INBOX` holding two messages and
    /// an empty `Sent` folder.
    pub fn seeded() -> Self {
        let inbox = vec![
            StoredMessage {
                email_message_id: "m1".to_string(),
                subject: "Welcome".to_string(),
                from: ("alice@example.com".to_string(), "Alice".to_string()),
                person_info: json!([]),
                sent_at: 1_700_000_000,
                bodies: vec![BodyContent {
                    content_type: "text/plain".to_string(),
                    charset: "utf-8".to_string(),
                    content: "Hello there".to_string(),
                }],
            },
            StoredMessage {
                email_message_id: "m2".to_string(),
                subject: "Lunch?".to_string(),
                from: ("bob@example.com".to_string(), "Bob".to_string()),
                person_info: json!({"bob@example.com": {"thumbnail": "https://example.com/bob.png"}}),
                sent_at: 1_700_000_600,
                bodies: vec![
                    BodyContent {
                        content_type: "text/plain".to_string(),
                        charset: "utf-8".to_string(),
                        content: "Noon?".to_string(),
                    },
                    BodyContent {
                        content_type: "text/html".to_string(),
                        charset: "utf-8".to_string(),
                        content: "<p>Noon?</p>".to_string(),
                    },
                ],
            },
        ];
        let mut account = Account::default();
        account.folders.insert("INBOX".to_string(), inbox);
        account.folders.insert("Sent".to_string(), Vec::new());

        let mut store = Store::default();
        store
            .accounts
            .insert(("u1".to_string(), "acct".to_string()), account);
        store
    }

    pub fn account(&self, user: &str, label: &str) -> Option<&Account> {
        self.accounts.get(&(user.to_string(), label.to_string()))
    }

    pub fn account_mut(&mut self, user: &str, label: &str) -> Option<&mut Account> {
        self.accounts.get_mut(&(user.to_string(), label.to_string()))
    }
}

fn folder_url(user: &str, label: &str, folder: &str) -> String {
    format!("{RESOURCE_ROOT}/users/{user}/email_accounts/{label}/folders/{folder}")
}

pub fn folder_json(user: &str, label: &str, name: &str, messages: &[StoredMessage]) -> Value {
    json!({
        "name": name,
        "symbolic_name": if name == "INBOX" { "\\Inbox" } else { "" },
        "nb_messages": messages.len(),
        "nb_unseen_messages": messages.len(),
        "delimiter": "/",
        "resource_url": folder_url(user, label, name),
    })
}

pub fn message_json(user: &str, label: &str, folder: &str, message: &StoredMessage) -> Value {
    let bodies: Vec<Value> = message
        .bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            json!({
                "body_section": (i + 1).to_string(),
                "type": body.content_type,
                "encoding": "7bit",
                "size": body.content.len(),
            })
        })
        .collect();
    json!({
        "email_message_id": message.email_message_id,
        "subject": message.subject,
        "message_id": format!("<{}@example.com>", message.email_message_id),
        "folders": [folder],
        "addresses": {"from": [{"email": message.from.0, "name": message.from.1}]},
        "person_info": message.person_info,
        "attachments": [],
        "bodies": bodies,
        "sent_at": message.sent_at,
        "received_at": message.sent_at + 5,
        "resource_url": format!(
            "{}/messages/{}",
            folder_url(user, label, folder),
            message.email_message_id
        ),
    })
}

pub fn body_json(message: &StoredMessage, body_type: Option<&str>) -> Vec<Value> {
    message
        .bodies
        .iter()
        .enumerate()
        .filter(|(_, body)| body_type.map_or(true, |t| t == body.content_type))
        .map(|(i, body)| {
            json!({
                "type": body.content_type,
                "charset": body.charset,
                "content": body.content,
                "body_section": (i + 1).to_string(),
            })
        })
        .collect()
}
