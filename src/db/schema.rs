pub const SCHEMA: &str = r#"
-- single key-value table: pk partitions records by kind (source / content),
-- sk identifies the record within its partition
CREATE TABLE IF NOT EXISTS records (
    pk TEXT NOT NULL,
    sk TEXT NOT NULL,
    type TEXT NOT NULL,
    content_url_pattern TEXT,
    title TEXT,
    description TEXT,
    unix_time INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (pk, sk)
);

CREATE INDEX IF NOT EXISTS idx_records_unix_time ON records(pk, unix_time DESC);
"#;
