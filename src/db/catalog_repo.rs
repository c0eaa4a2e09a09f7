// src/db/catalog_repo.rs
//
// Tabelas de consulta do catálogo. Operações simples de listagem e
// "buscar ou criar pelo nome" — colaboradoras do núcleo, sem lógica própria.

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::catalog::{Brand, Color, Material},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Cores ---

    pub async fn list_colors(&self) -> Result<Vec<Color>, AppError> {
        let colors = sqlx::query_as::<_, Color>(
            "SELECT id, name, hex_code, created_at, updated_at FROM colors ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(colors)
    }

    pub async fn find_color_by_name(&self, name: &str) -> Result<Option<Color>, AppError> {
        let color = sqlx::query_as::<_, Color>(
            "SELECT id, name, hex_code, created_at, updated_at FROM colors WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(color)
    }

    pub async fn create_color(&self, name: &str, hex_code: &str) -> Result<Color, AppError> {
        let color = sqlx::query_as::<_, Color>(
            r#"
            INSERT INTO colors (name, hex_code)
            VALUES ($1, $2)
            RETURNING id, name, hex_code, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(hex_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(color)
    }

    // --- Marcas ---

    pub async fn list_brands(&self) -> Result<Vec<Brand>, AppError> {
        let brands = sqlx::query_as::<_, Brand>(
            "SELECT id, name, created_at, updated_at FROM brands ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(brands)
    }

    pub async fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            "SELECT id, name, created_at, updated_at FROM brands WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(brand)
    }

    pub async fn create_brand(&self, name: &str) -> Result<Brand, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(brand)
    }

    // --- Materiais ---

    pub async fn list_materials(&self) -> Result<Vec<Material>, AppError> {
        let materials = sqlx::query_as::<_, Material>(
            "SELECT id, name, created_at, updated_at FROM materials ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(materials)
    }

    pub async fn find_material_by_name(&self, name: &str) -> Result<Option<Material>, AppError> {
        let material = sqlx::query_as::<_, Material>(
            "SELECT id, name, created_at, updated_at FROM materials WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(material)
    }

    pub async fn create_material(&self, name: &str) -> Result<Material, AppError> {
        let material = sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materials (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(material)
    }
}
