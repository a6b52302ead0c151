//! Insert/update lifecycle shared by entity services.

use async_trait::async_trait;
use common::Entity;
use store::DataProxy;

use crate::command::Command;
use crate::error::ServiceError;
use crate::rule::{RuleEngine, RuleSet};

/// Owns the insert/update lifecycle of one entity type.
///
/// Implementors supply the data proxy, the pre-write hooks and the rule sets;
/// the provided methods turn them into commands. Insert and update both run:
///
/// 1. the `on_before_*` hook, which may normalize the entity,
/// 2. the `rules_for_*` builder, which reads whatever reference data its rules need,
/// 3. the [`RuleEngine`], failing fast,
/// 4. the write, only if every rule passed.
#[async_trait]
pub trait ServiceBase: Send + Sync {
    type Entity: Entity;
    type Proxy: DataProxy<Self::Entity>;

    fn data_proxy(&self) -> &Self::Proxy;

    /// Normalizes an entity before insert rules are built.
    fn on_before_insert(&self, _entity: &mut Self::Entity) {}

    /// Normalizes an entity before update rules are built.
    fn on_before_update(&self, _entity: &mut Self::Entity) {}

    async fn rules_for_insert(&self, _entity: &Self::Entity) -> Result<RuleSet, ServiceError> {
        Ok(RuleSet::new())
    }

    async fn rules_for_update(&self, _entity: &Self::Entity) -> Result<RuleSet, ServiceError> {
        Ok(RuleSet::new())
    }

    /// Runs the insert lifecycle.
    async fn run_insert(&self, mut entity: Self::Entity) -> Result<Self::Entity, ServiceError> {
        self.on_before_insert(&mut entity);
        let rules = self.rules_for_insert(&entity).await?;
        RuleEngine::evaluate(&rules)?;
        let inserted = self.data_proxy().insert(entity).await?;
        tracing::info!(
            entity = <Self::Entity as Entity>::entity_type(),
            id = %inserted.id(),
            "entity inserted"
        );
        Ok(inserted)
    }

    /// Runs the update lifecycle.
    async fn run_update(&self, mut entity: Self::Entity) -> Result<Self::Entity, ServiceError> {
        self.on_before_update(&mut entity);
        let rules = self.rules_for_update(&entity).await?;
        RuleEngine::evaluate(&rules)?;
        let updated = self.data_proxy().update(entity).await?;
        tracing::info!(
            entity = <Self::Entity as Entity>::entity_type(),
            id = %updated.id(),
            "entity updated"
        );
        Ok(updated)
    }

    fn get_by_id_command(&self, id: <Self::Entity as Entity>::Id) -> Command<'_, Self::Entity> {
        Command::new("get_by_id", move || async move {
            self.data_proxy()
                .get_by_id(id)
                .await
                .map_err(ServiceError::from)
        })
    }

    fn get_all_command(&self) -> Command<'_, Vec<Self::Entity>> {
        Command::new("get_all", move || async move {
            self.data_proxy().get_all().await.map_err(ServiceError::from)
        })
    }

    fn insert_command(&self, entity: Self::Entity) -> Command<'_, Self::Entity> {
        Command::new("insert", move || self.run_insert(entity))
    }

    fn update_command(&self, entity: Self::Entity) -> Command<'_, Self::Entity> {
        Command::new("update", move || self.run_update(entity))
    }

    async fn get_by_id(
        &self,
        id: <Self::Entity as Entity>::Id,
    ) -> Result<Self::Entity, ServiceError> {
        self.get_by_id_command(id).execute().await
    }

    async fn insert(&self, entity: Self::Entity) -> Result<Self::Entity, ServiceError> {
        self.insert_command(entity).execute().await
    }

    async fn update(&self, entity: Self::Entity) -> Result<Self::Entity, ServiceError> {
        self.update_command(entity).execute().await
    }
}
