use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};

use super::DogStore;
use crate::model::{Dog, DogPatch, NewDog};

const DOG_COLUMNS: &str = "id, age, name, description, breed";

/// Dogs in a SQLite `dogs` table, reached through an sqlx pool.
#[derive(Clone)]
pub struct SqliteDogStore {
    pool: SqlitePool,
}

impl SqliteDogStore {
    /// Connect to `url`, creating the database file and table if needed.
    pub async fn connect(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dogs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                age INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                breed TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn dog_from_row(row: &SqliteRow) -> Result<Dog> {
    Ok(Dog {
        id: row.try_get("id")?,
        age: row.try_get("age")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        breed: row.try_get("breed")?,
    })
}

#[async_trait]
impl DogStore for SqliteDogStore {
    async fn find_all(&self) -> Result<Vec<Dog>> {
        let rows = sqlx::query(&format!("SELECT {DOG_COLUMNS} FROM dogs ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(dog_from_row).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Dog>> {
        let row = sqlx::query(&format!("SELECT {DOG_COLUMNS} FROM dogs WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(dog_from_row).transpose()
    }

    async fn create(&self, dog: NewDog) -> Result<Dog> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO dogs (age, name, description, breed)
            VALUES (?, ?, ?, ?)
            RETURNING {DOG_COLUMNS}
            "#
        ))
        .bind(dog.age)
        .bind(&dog.name)
        .bind(&dog.description)
        .bind(&dog.breed)
        .fetch_one(&self.pool)
        .await?;

        dog_from_row(&row)
    }

    async fn update_by_id(&self, id: i64, patch: DogPatch) -> Result<Option<Dog>> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE dogs SET
                age = COALESCE(?, age),
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                breed = COALESCE(?, breed)
            WHERE id = ?
            RETURNING {DOG_COLUMNS}
            "#
        ))
        .bind(patch.age)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.breed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(dog_from_row).transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<Option<Dog>> {
        // RETURNING hands back the row as it was before the delete.
        let row = sqlx::query(&format!("DELETE FROM dogs WHERE id = ? RETURNING {DOG_COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(dog_from_row).transpose()
    }
}
