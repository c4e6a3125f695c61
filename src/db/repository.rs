use async_trait::async_trait;
use rusqlite::{params, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{ContentItem, Source, SourceType, CONTENT_PARTITION, SOURCE_PARTITION};

use super::schema::SCHEMA;
use super::store::Store;

/// SQLite-backed `Store`.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Source provisioning

    /// Creates or replaces a source record. Returns `true` if it was new.
    pub async fn upsert_source(&self, source: Source) -> Result<bool> {
        let inserted = self
            .conn
            .call(move |conn| {
                let existed: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM records WHERE pk = ?1 AND sk = ?2)",
                    params![SOURCE_PARTITION, source.key],
                    |row| row.get(0),
                )?;
                conn.execute(
                    r#"INSERT INTO records (pk, sk, type, content_url_pattern)
                       VALUES (?1, ?2, ?3, ?4)
                       ON CONFLICT(pk, sk) DO UPDATE SET
                           type = excluded.type,
                           content_url_pattern = excluded.content_url_pattern"#,
                    params![
                        SOURCE_PARTITION,
                        source.key,
                        source.source_type.as_str(),
                        source.content_url_pattern,
                    ],
                )?;
                Ok(!existed)
            })
            .await?;
        Ok(inserted)
    }

    // Content reads

    pub async fn recent_content(&self, limit: usize) -> Result<Vec<ContentItem>> {
        // SQLite treats a negative LIMIT as no limit
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT sk, type, title, description, unix_time
                       FROM records
                       WHERE pk = ?1
                       ORDER BY unix_time DESC
                       LIMIT ?2"#,
                )?;
                let rows = stmt
                    .query_map(params![CONTENT_PARTITION, limit], content_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(key, kind, title, description, unix_time)| {
                let source_type = parse_type(&key, &kind)?;
                Some(ContentItem {
                    key,
                    source_type,
                    title,
                    description,
                    unix_time,
                })
            })
            .collect())
    }
}

#[async_trait]
impl Store for Repository {
    async fn load_sources(&self) -> Result<Vec<Source>> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT sk, type, content_url_pattern FROM records WHERE pk = ?1 ORDER BY sk",
                )?;
                let rows = stmt
                    .query_map(params![SOURCE_PARTITION], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Option<String>>(2)?,
                        ))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(key, kind, content_url_pattern)| {
                let source_type = parse_type(&key, &kind)?;
                Some(Source {
                    key,
                    source_type,
                    content_url_pattern,
                })
            })
            .collect())
    }

    async fn item_exists(&self, partition: &str, sort: &str) -> Result<bool> {
        tracing::debug!("Checking if record {{PK: {}, SK: {}}} exists", partition, sort);
        let partition = partition.to_string();
        let sort = sort.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM records WHERE pk = ?1 AND sk = ?2)",
                    params![partition, sort],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await?;
        Ok(exists)
    }

    async fn write_batch(&self, items: &[ContentItem]) -> Result<()> {
        let items = items.to_vec();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    // content records are immutable once written
                    let mut stmt = tx.prepare(
                        r#"INSERT OR IGNORE INTO records (pk, sk, type, title, description, unix_time)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                    )?;
                    for item in &items {
                        stmt.execute(params![
                            CONTENT_PARTITION,
                            item.key,
                            item.source_type.as_str(),
                            item.title,
                            item.description,
                            item.unix_time,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

type ContentRow = (String, String, String, String, i64);

fn content_row(row: &Row) -> rusqlite::Result<ContentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
    ))
}

fn parse_type(key: &str, kind: &str) -> Option<SourceType> {
    match kind.parse() {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(key, error = %e, "Skipping record with unknown type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str, unix_time: i64) -> ContentItem {
        ContentItem {
            key: key.into(),
            source_type: SourceType::Rss,
            title: "Title".into(),
            description: "Summary".into(),
            unix_time,
        }
    }

    #[tokio::test]
    async fn sources_round_trip() {
        let repo = Repository::in_memory().await.unwrap();
        let web = Source {
            key: "blog:https://example.com/".into(),
            source_type: SourceType::Web,
            content_url_pattern: Some(r"^https://example\.com/blog/.*$".into()),
        };
        assert!(repo.upsert_source(web.clone()).await.unwrap());
        assert!(!repo.upsert_source(web.clone()).await.unwrap());

        let sources = repo.load_sources().await.unwrap();
        assert_eq!(sources, vec![web]);
    }

    #[tokio::test]
    async fn content_and_sources_live_in_separate_partitions() {
        let repo = Repository::in_memory().await.unwrap();
        repo.write_batch(&[item("acme:https://acme.com/a", 1)])
            .await
            .unwrap();

        assert!(repo.load_sources().await.unwrap().is_empty());
        assert!(repo
            .item_exists(CONTENT_PARTITION, "acme:https://acme.com/a")
            .await
            .unwrap());
        assert!(!repo
            .item_exists(SOURCE_PARTITION, "acme:https://acme.com/a")
            .await
            .unwrap());
        assert!(!repo
            .item_exists(CONTENT_PARTITION, "other:https://acme.com/a")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn existing_content_is_never_overwritten() {
        let repo = Repository::in_memory().await.unwrap();
        repo.write_batch(&[item("acme:https://acme.com/a", 1)])
            .await
            .unwrap();

        let mut changed = item("acme:https://acme.com/a", 2);
        changed.title = "Changed".into();
        repo.write_batch(&[changed]).await.unwrap();

        let stored = repo.recent_content(10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Title");
        assert_eq!(stored[0].unix_time, 1);
    }

    #[tokio::test]
    async fn recent_content_is_newest_first() {
        let repo = Repository::in_memory().await.unwrap();
        repo.write_batch(&[
            item("acme:https://acme.com/old", 10),
            item("acme:https://acme.com/new", 30),
            item("acme:https://acme.com/mid", 20),
        ])
        .await
        .unwrap();

        let keys: Vec<String> = repo
            .recent_content(2)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["acme:https://acme.com/new", "acme:https://acme.com/mid"]);
    }

    #[tokio::test]
    async fn huge_limit_returns_everything() {
        let repo = Repository::in_memory().await.unwrap();
        repo.write_batch(&[
            item("acme:https://acme.com/a", 1),
            item("acme:https://acme.com/b", 2),
        ])
        .await
        .unwrap();

        assert_eq!(repo.recent_content(usize::MAX).await.unwrap().len(), 2);
        assert_eq!(repo.recent_content(usize::MAX / 2 + 1).await.unwrap().len(), 2);
        assert!(repo.recent_content(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawler.db");
        let path = path.to_str().unwrap();

        {
            let repo = Repository::new(path).await.unwrap();
            repo.write_batch(&[item("acme:https://acme.com/a", 1)])
                .await
                .unwrap();
        }

        let repo = Repository::new(path).await.unwrap();
        assert!(repo
            .item_exists(CONTENT_PARTITION, "acme:https://acme.com/a")
            .await
            .unwrap());
    }
}
