// src/services/catalog.rs
//
// Catálogo de cores, marcas e materiais. A escrita tem semântica de
// "buscar ou criar pelo nome": pedir um nome já existente devolve o
// registro existente em vez de duplicar ou falhar.

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::{
        activity_log::{action_type, entity_type},
        auth::User,
        catalog::{Brand, Color, Material},
    },
    services::activity_log::ActivityLogService,
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    activity_logs: ActivityLogService,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, activity_logs: ActivityLogService) -> Self {
        Self { repo, activity_logs }
    }

    // O log nunca derruba a operação principal
    async fn log_created(
        &self,
        action: &str,
        entity: &str,
        description: String,
        entity_id: uuid::Uuid,
        user: &User,
    ) {
        if let Err(e) = self
            .activity_logs
            .log(action, entity, description, Some(entity_id), None, Some(user))
            .await
        {
            tracing::warn!("Falha ao registrar atividade do catálogo: {e}");
        }
    }

    pub async fn list_colors(&self) -> Result<Vec<Color>, AppError> {
        self.repo.list_colors().await
    }

    pub async fn get_or_create_color(
        &self,
        name: &str,
        hex_code: &str,
        user: &User,
    ) -> Result<Color, AppError> {
        if let Some(existing) = self.repo.find_color_by_name(name).await? {
            return Ok(existing);
        }

        let color = self.repo.create_color(name, hex_code).await?;
        self.log_created(
            action_type::COLOR_CREATED,
            entity_type::COLOR,
            format!("Cor '{}' adicionada ao catálogo", color.name),
            color.id,
            user,
        )
        .await;
        Ok(color)
    }

    pub async fn list_brands(&self) -> Result<Vec<Brand>, AppError> {
        self.repo.list_brands().await
    }

    pub async fn get_or_create_brand(&self, name: &str, user: &User) -> Result<Brand, AppError> {
        if let Some(existing) = self.repo.find_brand_by_name(name).await? {
            return Ok(existing);
        }

        let brand = self.repo.create_brand(name).await?;
        self.log_created(
            action_type::BRAND_CREATED,
            entity_type::BRAND,
            format!("Marca '{}' adicionada ao catálogo", brand.name),
            brand.id,
            user,
        )
        .await;
        Ok(brand)
    }

    pub async fn list_materials(&self) -> Result<Vec<Material>, AppError> {
        self.repo.list_materials().await
    }

    pub async fn get_or_create_material(
        &self,
        name: &str,
        user: &User,
    ) -> Result<Material, AppError> {
        if let Some(existing) = self.repo.find_material_by_name(name).await? {
            return Ok(existing);
        }

        let material = self.repo.create_material(name).await?;
        self.log_created(
            action_type::MATERIAL_CREATED,
            entity_type::MATERIAL,
            format!("Material '{}' adicionado ao catálogo", material.name),
            material.id,
            user,
        )
        .await;
        Ok(material)
    }
}
