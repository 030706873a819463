//! Medicine catalog operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Medicine;

impl Database {
    /// Insert or update a medicine.
    pub fn upsert_medicine(&self, medicine: &Medicine) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medicines (
                id, name, description, price, prescription_required,
                category, image, stock, manufacturer, dosage, form,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                price = excluded.price,
                prescription_required = excluded.prescription_required,
                category = excluded.category,
                image = excluded.image,
                stock = excluded.stock,
                manufacturer = excluded.manufacturer,
                dosage = excluded.dosage,
                form = excluded.form,
                updated_at = datetime('now')
            "#,
            params![
                medicine.id,
                medicine.name,
                medicine.description,
                medicine.price,
                medicine.prescription_required,
                medicine.category,
                medicine.image,
                medicine.stock,
                medicine.manufacturer,
                medicine.dosage,
                medicine.form,
                medicine.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a medicine by ID.
    pub fn get_medicine(&self, id: &str) -> DbResult<Option<Medicine>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, name, description, price, prescription_required,
                       category, image, stock, manufacturer, dosage, form,
                       created_at, updated_at
                FROM medicines
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(Medicine {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        price: row.get(3)?,
                        prescription_required: row.get(4)?,
                        category: row.get(5)?,
                        image: row.get(6)?,
                        stock: row.get(7)?,
                        manufacturer: row.get(8)?,
                        dosage: row.get(9)?,
                        form: row.get(10)?,
                        created_at: row.get(11)?,
                        updated_at: row.get(12)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// Count all medicines (dashboard report).
    pub fn count_medicines(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Count medicines below the low-stock threshold (dashboard report).
    pub fn count_low_stock_medicines(&self) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM medicines WHERE stock < 10",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
