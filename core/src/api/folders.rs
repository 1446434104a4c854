//! Folders of a user's email account (Lite API).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::http::LogicalRequest;
use crate::params::{is_default, percent_encode};

/// Query values for listing folders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FoldersParams {
    #[serde(skip_serializing_if = "is_default")]
    pub include_names_only: bool,
}

/// Query or form values shared by single-folder calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderParams {
    #[serde(skip_serializing_if = "is_default")]
    pub delimiter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    pub name: String,
    pub symbolic_name: String,
    pub nb_messages: u64,
    pub nb_unseen_messages: u64,
    pub delimiter: String,
    pub resource_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateFolderResponse {
    pub success: bool,
}

pub(crate) fn folder_path(user_id: &str, label: &str, folder: &str) -> String {
    format!(
        "/users/{}/email_accounts/{}/folders/{}",
        percent_encode(user_id),
        percent_encode(label),
        percent_encode(folder)
    )
}

impl Client {
    pub fn get_folders(
        &self,
        user_id: &str,
        label: &str,
        params: &FoldersParams,
    ) -> Result<Vec<Folder>> {
        let path = format!(
            "/users/{}/email_accounts/{}/folders",
            percent_encode(user_id),
            percent_encode(label)
        );
        self.perform(LogicalRequest::get(path).with_query(params))
    }

    pub fn get_folder(
        &self,
        user_id: &str,
        label: &str,
        folder: &str,
        params: &FolderParams,
    ) -> Result<Folder> {
        self.perform(LogicalRequest::get(folder_path(user_id, label, folder)).with_query(params))
    }

    /// Create a folder. The server rejects folders that already exist.
    pub fn create_folder(
        &self,
        user_id: &str,
        label: &str,
        folder: &str,
        params: &FolderParams,
    ) -> Result<CreateFolderResponse> {
        self.perform(LogicalRequest::post(folder_path(user_id, label, folder)).with_form(params))
    }

    /// Create `folder` unless it already exists.
    ///
    /// Returns `true` when the folder had to be created. Only a 404 from the
    /// probe counts as "absent"; any other probe failure is returned as is.
    pub fn create_folder_if_missing(
        &self,
        user_id: &str,
        label: &str,
        folder: &str,
        params: &FolderParams,
    ) -> Result<bool> {
        match self.get_folder(user_id, label, folder, params) {
            Ok(existing) if existing.name == folder => return Ok(false),
            Ok(existing) => {
                debug!(requested = folder, found = %existing.name, "folder probe returned another name");
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let created = self.create_folder(user_id, label, folder, params)?;
        if !created.success {
            return Err(Error::Refused(format!("unable to create folder {folder}")));
        }
        Ok(true)
    }
}
