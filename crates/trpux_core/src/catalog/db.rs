use async_trait::async_trait;

use super::CatalogStore;
use crate::Result;
use trpux_db::queries;
use trpux_db::{
    CardType, CatalogDb, Compatibility, NewServer, NewSource, Server, ServerArgument, Source,
    SourceType,
};

#[async_trait]
impl CatalogStore for CatalogDb {
    async fn list_servers(&self) -> Result<Vec<Server>> {
        Ok(queries::list_servers(self.pool()).await?)
    }

    async fn find_server(&self, id: i64) -> Result<Option<Server>> {
        Ok(queries::get_server(self.pool(), id).await?)
    }

    async fn server_arguments(&self, server_id: i64) -> Result<Vec<ServerArgument>> {
        Ok(queries::list_server_arguments(self.pool(), server_id).await?)
    }

    async fn save_server(&self, server: &NewServer) -> Result<Server> {
        Ok(queries::create_server(self.pool(), server).await?)
    }

    async fn update_server(&self, id: i64, server: &NewServer) -> Result<bool> {
        Ok(queries::update_server(self.pool(), id, server).await?)
    }

    async fn remove_server(&self, id: i64) -> Result<bool> {
        Ok(queries::delete_server(self.pool(), id).await?)
    }

    async fn mark_server_reachable(&self, id: i64, reachable: bool) -> Result<()> {
        queries::set_server_reachable(self.pool(), id, reachable).await?;
        Ok(())
    }

    async fn list_sources(&self) -> Result<Vec<Source>> {
        Ok(queries::list_sources(self.pool()).await?)
    }

    async fn find_source(&self, id: i64) -> Result<Option<Source>> {
        Ok(queries::get_source(self.pool(), id).await?)
    }

    async fn save_source(&self, source: &NewSource) -> Result<Option<Source>> {
        Ok(queries::insert_source_if_absent(self.pool(), source).await?)
    }

    async fn remove_source(&self, id: i64) -> Result<bool> {
        Ok(queries::delete_source(self.pool(), id).await?)
    }

    async fn list_source_types(&self) -> Result<Vec<SourceType>> {
        Ok(queries::list_source_types(self.pool()).await?)
    }

    async fn ensure_source_type(&self, name: &str) -> Result<SourceType> {
        Ok(queries::ensure_source_type(self.pool(), name).await?)
    }

    async fn list_card_types(&self) -> Result<Vec<CardType>> {
        Ok(queries::list_card_types(self.pool()).await?)
    }

    async fn ensure_card_type(&self, name: &str, can_be_aggregated: bool) -> Result<CardType> {
        Ok(queries::ensure_card_type(self.pool(), name, can_be_aggregated).await?)
    }

    async fn list_compatibilities(&self) -> Result<Vec<Compatibility>> {
        Ok(queries::list_compatibilities(self.pool()).await?)
    }

    async fn link_compatibility(
        &self,
        card_type_id: i64,
        source_type_ids: &[i64],
    ) -> Result<Compatibility> {
        Ok(queries::link_compatibility(self.pool(), card_type_id, source_type_ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_helpers::{create_test_server, test_db};

    fn new_source(address: &str, server_id: i64) -> NewSource {
        NewSource {
            name: address.trim_matches('/').to_string(),
            address: address.to_string(),
            source_type_id: None,
            server_id,
        }
    }

    #[tokio::test]
    async fn test_remove_source_leaves_server_and_siblings() {
        let db = test_db().await;
        let server = create_test_server(&db, "https://jenkins.test/", "jenkins").await;

        let matrix = db
            .save_source(&new_source("/matrix/", server.id))
            .await
            .unwrap()
            .unwrap();
        let makefile = db
            .save_source(&new_source("/makefile/", server.id))
            .await
            .unwrap()
            .unwrap();

        assert!(db.remove_source(matrix.id).await.unwrap());
        assert!(!db.remove_source(matrix.id).await.unwrap());
        assert_eq!(db.find_source(matrix.id).await.unwrap(), None);

        let remaining: Vec<i64> = db
            .list_sources()
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(remaining, vec![makefile.id]);
        assert!(db.find_server(server.id).await.unwrap().is_some());
        assert_eq!(db.server_arguments(server.id).await.unwrap().len(), 1);

        // A removed address can be discovered again
        let again = db.save_source(&new_source("/matrix/", server.id)).await.unwrap();
        assert!(again.is_some());
    }
}
