//! Server administration.

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::CatalogStore;
use crate::{CoreError, Result};
use trpux_db::{NewServer, NewServerArgument, Server};

/// Unvalidated server input, as submitted by an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDraft {
    pub name: String,
    pub url: String,
    pub server_type: String,
    #[serde(default)]
    pub disabled: bool,
    /// `None` leaves existing arguments untouched on update
    #[serde(default)]
    pub arguments: Option<Vec<NewServerArgument>>,
}

impl ServerDraft {
    /// Trim and check the draft, normalizing the URL to origin plus path.
    pub fn validate(&self) -> Result<NewServer> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid_server("name", "Server name cannot be empty!"));
        }

        let server_type = self.server_type.trim();
        if server_type.is_empty() {
            return Err(CoreError::invalid_server("type", "Server type cannot be empty!"));
        }

        Ok(NewServer {
            name: name.to_string(),
            url: normalize_url(self.url.trim())?,
            server_type: server_type.to_string(),
            disabled: self.disabled,
            arguments: self.arguments.clone(),
        })
    }
}

/// Reduce a URL to its origin and path, dropping query, fragment and credentials.
pub fn normalize_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw).map_err(|e| CoreError::invalid_server("url", format!("{raw}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CoreError::invalid_server(
            "url",
            format!("{raw}: only http and https servers are supported"),
        ));
    }

    Ok(format!("{}{}", url.origin().ascii_serialization(), url.path()))
}

pub async fn create_server(store: &dyn CatalogStore, draft: &ServerDraft) -> Result<Server> {
    let server = store.save_server(&draft.validate()?).await?;
    info!(server = %server.name, url = %server.url, "Created server");
    Ok(server)
}

pub async fn update_server(
    store: &dyn CatalogStore,
    id: i64,
    draft: &ServerDraft,
) -> Result<Server> {
    let new_server = draft.validate()?;
    if !store.update_server(id, &new_server).await? {
        return Err(CoreError::ServerNotFound { id });
    }
    info!(server_id = id, "Updated server");
    store
        .find_server(id)
        .await?
        .ok_or(CoreError::ServerNotFound { id })
}

/// Delete a server together with its arguments and sources.
pub async fn delete_server(store: &dyn CatalogStore, id: i64) -> Result<()> {
    if !store.remove_server(id).await? {
        return Err(CoreError::ServerNotFound { id });
    }
    info!(server_id = id, "Deleted server");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_helpers::test_db;

    fn draft(url: &str) -> ServerDraft {
        ServerDraft {
            name: "  Jenkins ".to_string(),
            url: url.to_string(),
            server_type: " jenkins".to_string(),
            disabled: false,
            arguments: Some(vec![NewServerArgument::new("token", "secret")]),
        }
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://user:pw@ci.example.com:8443/jenkins/?q=1#top").unwrap(),
            "https://ci.example.com:8443/jenkins/"
        );
        assert_eq!(normalize_url("http://ci.example.com").unwrap(), "http://ci.example.com/");
        assert!(normalize_url("not a url").is_err());
        assert!(normalize_url("ftp://ci.example.com/").is_err());
    }

    #[test]
    fn test_validate_trims_and_rejects_blanks() {
        let server = draft("https://ci.example.com/a?b").validate().unwrap();
        assert_eq!(server.name, "Jenkins");
        assert_eq!(server.server_type, "jenkins");
        assert_eq!(server.url, "https://ci.example.com/a");

        let mut blank_name = draft("https://ci.example.com/");
        blank_name.name = "   ".into();
        assert!(matches!(
            blank_name.validate(),
            Err(CoreError::InvalidServer { field: "name", .. })
        ));

        let mut blank_type = draft("https://ci.example.com/");
        blank_type.server_type = String::new();
        assert!(matches!(
            blank_type.validate(),
            Err(CoreError::InvalidServer { field: "type", .. })
        ));
    }

    #[tokio::test]
    async fn test_server_admin_cycle() {
        let db = test_db().await;

        let server = create_server(&db, &draft("https://ci.example.com/")).await.unwrap();
        assert_eq!(db.server_arguments(server.id).await.unwrap().len(), 1);

        let mut renamed = draft("https://ci.example.com/");
        renamed.name = "Renamed".into();
        renamed.arguments = None;
        let updated = update_server(&db, server.id, &renamed).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(db.server_arguments(server.id).await.unwrap().len(), 1);

        assert!(matches!(
            update_server(&db, 404, &renamed).await,
            Err(CoreError::ServerNotFound { id: 404 })
        ));

        delete_server(&db, server.id).await.unwrap();
        assert!(matches!(
            delete_server(&db, server.id).await,
            Err(CoreError::ServerNotFound { .. })
        ));
    }
}
