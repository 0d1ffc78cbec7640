//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Metrics are archived, never deleted, while entries reference them.
CREATE TABLE IF NOT EXISTS metrics (
    metric_id   TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    name        TEXT NOT NULL,
    metric_type TEXT NOT NULL,   -- discriminant of MetricKind
    config_json TEXT NOT NULL,   -- JSON payload (config only)
    direction   TEXT NOT NULL DEFAULT 'positive',
    required    INTEGER NOT NULL DEFAULT 0,
    archived_at TEXT,            -- ISO 8601 UTC or NULL while active
    created_at  TEXT NOT NULL
);

-- One value per (user, metric, day); exactly one typed slot is populated.
CREATE TABLE IF NOT EXISTS day_entries (
    user_id     TEXT NOT NULL,
    metric_id   TEXT NOT NULL REFERENCES metrics(metric_id),
    day_id      TEXT NOT NULL,   -- opaque YYYY-MM-DD
    bool_value  INTEGER,
    int_value   INTEGER,
    float_value REAL,
    text_value  TEXT,
    select_key  TEXT,
    tag_keys    TEXT,            -- JSON array of option keys
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, metric_id, day_id),
    CHECK ((bool_value  IS NOT NULL) + (int_value  IS NOT NULL)
         + (float_value IS NOT NULL) + (text_value IS NOT NULL)
         + (select_key  IS NOT NULL) + (tag_keys   IS NOT NULL) = 1)
);

-- Snapshot written by every submission.
CREATE TABLE IF NOT EXISTS day_checkins (
    user_id        TEXT NOT NULL,
    day_id         TEXT NOT NULL,
    status         TEXT NOT NULL CHECK (status IN ('draft', 'submitted')),
    completion_pct INTEGER NOT NULL CHECK (completion_pct BETWEEN 0 AND 100),
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    PRIMARY KEY (user_id, day_id)
);

CREATE INDEX IF NOT EXISTS metrics_user_idx     ON metrics(user_id);
CREATE INDEX IF NOT EXISTS day_entries_day_idx  ON day_entries(user_id, day_id);

PRAGMA user_version = 1;
";
