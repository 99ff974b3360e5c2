use async_trait::async_trait;
use ps_core::{ArticleField, ArticleRecord, ArticleStore, Error, Result, StoredArticle};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;
use crate::StorageBackend;

const DEFAULT_DB_PATH: &str = "articles.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        collection TEXT NOT NULL,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        excerpt TEXT NOT NULL,
        genre TEXT NOT NULL,
        image TEXT NOT NULL,
        publish_date TEXT NOT NULL,
        body TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_collection ON articles (collection)",
];

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./articles.db"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        let db_path = PathBuf::from(url.unwrap_or(DEFAULT_DB_PATH));
        Self::new_with_path(&db_path).await
    }
}

fn db_error(context: &str, e: sqlx::Error) -> Error {
    Error::Database(format!("{}: {}", context, e))
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &PathBuf {
        &self.db_path
    }

    async fn ensure_collection(&self, collection: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO collections (name) VALUES (?)")
            .bind(collection)
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to register collection", e))?;
        Ok(())
    }
}

fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> StoredArticle {
    StoredArticle {
        id: row.get("id"),
        record: ArticleRecord {
            title: row.get("title"),
            author: row.get("author"),
            excerpt: row.get("excerpt"),
            genre: row.get("genre"),
            image: row.get("image"),
            publish_date: row.get("publish_date"),
            body: row.get("body"),
        },
    }
}

#[async_trait]
impl ArticleStore for SQLiteStorage {
    async fn clear(&self, collection: &str) -> Result<()> {
        self.ensure_collection(collection).await?;
        sqlx::query("DELETE FROM articles WHERE collection = ?")
            .bind(collection)
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to clear collection", e))?;
        Ok(())
    }

    async fn insert(&self, collection: &str, record: &ArticleRecord) -> Result<String> {
        self.ensure_collection(collection).await?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO articles
            (id, collection, title, author, excerpt, genre, image, publish_date, body)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(collection)
        .bind(&record.title)
        .bind(&record.author)
        .bind(&record.excerpt)
        .bind(&record.genre)
        .bind(&record.image)
        .bind(&record.publish_date)
        .bind(&record.body)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to store article", e))?;

        Ok(id)
    }

    async fn list_by_collections(&self, collections: &[String]) -> Result<Vec<StoredArticle>> {
        let mut articles = Vec::new();
        for collection in collections {
            let rows = sqlx::query("SELECT * FROM articles WHERE collection = ? ORDER BY seq")
                .bind(collection)
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| db_error("Failed to list articles", e))?;
            articles.extend(rows.iter().map(row_to_article));
        }
        Ok(articles)
    }

    async fn distinct_values(&self, field: ArticleField, collection: &str) -> Result<Vec<String>> {
        // Column names come from a closed enum, never from user input.
        let query = format!(
            "SELECT {col} FROM articles WHERE collection = ? GROUP BY {col} ORDER BY MIN(seq)",
            col = field.key()
        );
        let rows = sqlx::query(&query)
            .bind(collection)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to read distinct values", e))?;
        Ok(rows.iter().map(|row| row.get::<String, _>(0)).collect())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM collections ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to list collections", e))?;
        Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
    }
}
