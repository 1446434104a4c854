//! Endpoint bindings.
//!
//! Each binding builds a `LogicalRequest` and hands it to
//! `Client::perform`. Path parameters are escaped here, before the path is
//! signed.

pub mod discovery;
pub mod folders;
pub mod messages;
pub mod oauth_providers;

pub use discovery::{DiscoveryImap, DiscoveryParams, DiscoveryResponse};
pub use folders::{CreateFolderResponse, Folder, FolderParams, FoldersParams};
pub use messages::{
    Address, Addresses, Attachment, BodyPart, Message, MessageBody, MessageBodyParams,
    MessageParams, MoveMessageParams, MoveMessageResponse, PersonInfo,
};
pub use oauth_providers::{
    CreateOAuthProviderParams, CreateOAuthProviderResponse, DeleteOAuthProviderResponse,
    OAuthProvider,
};
