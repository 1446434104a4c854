//! Messages inside a folder (Lite API).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::folders::folder_path;
use crate::client::Client;
use crate::decode::LooseMap;
use crate::error::Result;
use crate::http::LogicalRequest;
use crate::params::{is_default, percent_encode};

/// Contact details keyed by address. Sent as `[]` when there are none.
pub type PersonInfo = LooseMap<String, BTreeMap<String, String>>;

/// Query values for listing or fetching messages. `limit` and `offset`
/// only apply to listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageParams {
    #[serde(skip_serializing_if = "is_default")]
    pub delimiter: String,
    #[serde(skip_serializing_if = "is_default")]
    pub body_type: String,
    #[serde(skip_serializing_if = "is_default")]
    pub include_body: bool,
    #[serde(skip_serializing_if = "is_default")]
    pub include_flags: bool,
    /// `0`, `1` or `raw`.
    #[serde(skip_serializing_if = "is_default")]
    pub include_headers: String,
    #[serde(skip_serializing_if = "is_default")]
    pub limit: u32,
    #[serde(skip_serializing_if = "is_default")]
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Addresses {
    pub from: Vec<Address>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub sender: Vec<Address>,
    pub reply_to: Vec<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub content_type: String,
    pub file_name: String,
    pub body_section: String,
    pub content_disposition: String,
    pub email_message_id: String,
    pub x_attachment_id: String,
    pub size: u64,
    pub attachment_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyPart {
    pub body_section: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub encoding: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub email_message_id: String,
    pub subject: String,
    pub message_id: String,
    pub in_reply_to: String,
    pub resource_url: String,
    pub folders: Vec<String>,
    pub list_headers: Vec<String>,
    pub references: Vec<String>,
    pub received_headers: Vec<String>,
    pub addresses: Addresses,
    pub person_info: PersonInfo,
    pub attachments: Vec<Attachment>,
    pub bodies: Vec<BodyPart>,
    pub sent_at: i64,
    pub received_at: i64,
}

/// Values for moving a message. `new_folder_id` is required.
#[derive(Debug, Clone, Serialize)]
pub struct MoveMessageParams {
    pub new_folder_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub delimiter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MoveMessageResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageBodyParams {
    #[serde(skip_serializing_if = "is_default")]
    pub delimiter: String,
    #[serde(rename = "type", skip_serializing_if = "is_default")]
    pub body_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageBody {
    #[serde(rename = "type")]
    pub content_type: String,
    pub charset: String,
    pub content: String,
    pub body_section: String,
}

fn message_path(user_id: &str, label: &str, folder: &str, message_id: &str) -> String {
    format!(
        "{}/messages/{}",
        folder_path(user_id, label, folder),
        percent_encode(message_id)
    )
}

impl Client {
    pub fn get_messages(
        &self,
        user_id: &str,
        label: &str,
        folder: &str,
        params: &MessageParams,
    ) -> Result<Vec<Message>> {
        let path = format!("{}/messages", folder_path(user_id, label, folder));
        self.perform(LogicalRequest::get(path).with_query(params))
    }

    pub fn get_message(
        &self,
        user_id: &str,
        label: &str,
        folder: &str,
        message_id: &str,
        params: &MessageParams,
    ) -> Result<Message> {
        let path = message_path(user_id, label, folder, message_id);
        self.perform(LogicalRequest::get(path).with_query(params))
    }

    /// Move a message to `params.new_folder_id`. The values travel in the
    /// query string.
    pub fn move_message(
        &self,
        user_id: &str,
        label: &str,
        folder: &str,
        message_id: &str,
        params: &MoveMessageParams,
    ) -> Result<MoveMessageResponse> {
        let path = message_path(user_id, label, folder, message_id);
        self.perform(LogicalRequest::put(path).with_query(params))
    }

    pub fn get_message_body(
        &self,
        user_id: &str,
        label: &str,
        folder: &str,
        message_id: &str,
        params: &MessageBodyParams,
    ) -> Result<Vec<MessageBody>> {
        let path = format!("{}/body", message_path(user_id, label, folder, message_id));
        self.perform(LogicalRequest::get(path).with_query(params))
    }
}
