//! SQLite schema definition.

/// Complete database schema for the vial catalog.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Vial Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS vial_catalog (
    code TEXT PRIMARY KEY,
    drug TEXT NOT NULL,
    strength_mg REAL NOT NULL,
    original_brand INTEGER NOT NULL DEFAULT 0,
    description TEXT,
    opd_thai_price REAL,                          -- NULL when not sold under this column
    ipd_thai_price REAL,
    opd_inter_price REAL,
    ipd_inter_price REAL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_vial_catalog_drug ON vial_catalog(drug);
"#;
