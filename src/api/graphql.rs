use async_graphql::{Context, EmptySubscription, Object, Schema};
use std::sync::Arc;

use crate::domain::inventory_service::InventoryService;
use crate::domain::types::{JumpServerConfig, ServerRecord};
use crate::scan::ScanSnapshot;

pub type InfrascanSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Servers matching every term of `query` (all servers when omitted).
    async fn servers(
        &self,
        ctx: &Context<'_>,
        query: Option<String>,
    ) -> async_graphql::Result<Vec<ServerRecord>> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        Ok(svc.servers(query.as_deref().unwrap_or("")).await)
    }

    async fn server(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<Option<ServerRecord>> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        Ok(svc.server(&id).await)
    }

    async fn search_history(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        Ok(svc.search_history().await)
    }

    /// Effective jump host, credentials masked.
    async fn jump_host(&self, ctx: &Context<'_>) -> async_graphql::Result<JumpServerConfig> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        Ok(svc.jump_host().await.redacted())
    }

    async fn scan(&self, ctx: &Context<'_>) -> async_graphql::Result<ScanSnapshot> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        Ok(svc.scan().snapshot().await)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Remove a server. Nothing happens unless `confirm` is true.
    async fn remove_server(
        &self,
        ctx: &Context<'_>,
        id: String,
        confirm: bool,
    ) -> async_graphql::Result<Option<ServerRecord>> {
        if !confirm {
            return Err(async_graphql::Error::new("deletion must be confirmed"));
        }
        let svc = ctx.data::<Arc<InventoryService>>()?;
        Ok(svc.remove_server(&id).await)
    }

    async fn record_search(
        &self,
        ctx: &Context<'_>,
        query: String,
    ) -> async_graphql::Result<Vec<String>> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        Ok(svc.record_search(&query).await)
    }

    async fn clear_search_history(&self, ctx: &Context<'_>) -> async_graphql::Result<bool> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        svc.clear_search_history().await;
        Ok(true)
    }

    async fn save_jump_host(
        &self,
        ctx: &Context<'_>,
        config: JumpServerConfig,
    ) -> async_graphql::Result<JumpServerConfig> {
        let svc = ctx.data::<Arc<InventoryService>>()?;
        let redacted = config.redacted();
        svc.save_jump_host(config).await;
        Ok(redacted)
    }
}

pub fn build_schema(inventory: Arc<InventoryService>) -> InfrascanSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(inventory)
        .finish()
}
