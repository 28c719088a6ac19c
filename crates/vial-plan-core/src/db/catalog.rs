//! Vial catalog database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::catalog::{CatalogProvider, CatalogResult};
use crate::models::{CatalogVial, VialPrices};

const SELECT_VIAL: &str = r#"
    SELECT code, drug, strength_mg, original_brand, description,
           opd_thai_price, ipd_thai_price, opd_inter_price, ipd_inter_price
    FROM vial_catalog
"#;

impl Database {
    /// Insert or update a vial.
    pub fn upsert_vial(&self, vial: &CatalogVial) -> DbResult<()> {
        upsert(&self.conn, vial)
    }

    /// Insert or update many vials in one transaction.
    ///
    /// Nothing is written if any vial is rejected.
    pub fn import_vials(&mut self, vials: &[CatalogVial]) -> DbResult<usize> {
        let tx = self.transaction()?;
        for vial in vials {
            upsert(&tx, vial)?;
        }
        tx.commit()?;
        Ok(vials.len())
    }

    /// Get a vial by catalog code.
    pub fn get_vial(&self, code: &str) -> DbResult<Option<CatalogVial>> {
        let sql = format!("{SELECT_VIAL} WHERE code = ?");
        let vial = self
            .conn
            .query_row(&sql, [code], read_vial)
            .optional()?;
        Ok(vial)
    }

    /// All vials for a drug, in insertion order.
    pub fn vials_for_drug(&self, drug: &str) -> DbResult<Vec<CatalogVial>> {
        let sql = format!("{SELECT_VIAL} WHERE drug = ? ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([drug], read_vial)?;

        let mut vials = Vec::new();
        for row in rows {
            vials.push(row?);
        }
        Ok(vials)
    }

    /// Distinct drug names, sorted.
    pub fn list_drugs(&self) -> DbResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT drug FROM vial_catalog ORDER BY drug")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut drugs = Vec::new();
        for row in rows {
            drugs.push(row?);
        }
        Ok(drugs)
    }

    /// Delete a vial.
    pub fn delete_vial(&self, code: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM vial_catalog WHERE code = ?", [code])?;
        Ok(rows_affected > 0)
    }
}

impl CatalogProvider for Database {
    fn get_options(&self, drug: &str) -> CatalogResult<Vec<CatalogVial>> {
        Ok(self.vials_for_drug(drug)?)
    }

    fn drugs(&self) -> CatalogResult<Vec<String>> {
        Ok(self.list_drugs()?)
    }
}

fn upsert(conn: &Connection, vial: &CatalogVial) -> DbResult<()> {
    if vial.code.trim().is_empty() {
        return Err(DbError::Constraint("vial code must not be empty".into()));
    }
    if vial.drug.trim().is_empty() {
        return Err(DbError::Constraint(format!(
            "vial {} has no drug name",
            vial.code
        )));
    }
    if !vial.strength_mg.is_finite() || vial.strength_mg <= 0.0 {
        return Err(DbError::Constraint(format!(
            "vial {} has invalid strength {}",
            vial.code, vial.strength_mg
        )));
    }

    conn.execute(
        r#"
        INSERT INTO vial_catalog (
            code, drug, strength_mg, original_brand, description,
            opd_thai_price, ipd_thai_price, opd_inter_price, ipd_inter_price, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
        ON CONFLICT(code) DO UPDATE SET
            drug = excluded.drug,
            strength_mg = excluded.strength_mg,
            original_brand = excluded.original_brand,
            description = excluded.description,
            opd_thai_price = excluded.opd_thai_price,
            ipd_thai_price = excluded.ipd_thai_price,
            opd_inter_price = excluded.opd_inter_price,
            ipd_inter_price = excluded.ipd_inter_price,
            updated_at = datetime('now')
        "#,
        params![
            vial.code,
            vial.drug,
            vial.strength_mg,
            vial.original_brand,
            vial.description,
            vial.prices.opd_thai,
            vial.prices.ipd_thai,
            vial.prices.opd_international,
            vial.prices.ipd_international,
        ],
    )?;
    Ok(())
}

fn read_vial(row: &Row<'_>) -> rusqlite::Result<CatalogVial> {
    Ok(CatalogVial {
        code: row.get(0)?,
        drug: row.get(1)?,
        strength_mg: row.get(2)?,
        original_brand: row.get(3)?,
        description: row.get(4)?,
        prices: VialPrices {
            opd_thai: row.get(5)?,
            ipd_thai: row.get(6)?,
            opd_international: row.get(7)?,
            ipd_international: row.get(8)?,
        },
    })
}
