pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS presets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    data TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_presets_created
    ON presets(created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_presets_name
    ON presets(name COLLATE NOCASE);
"#;
