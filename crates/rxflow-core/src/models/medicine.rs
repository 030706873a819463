//! Medicine catalog models.

use serde::{Deserialize, Serialize};

/// A catalog medicine. Read-only from the lifecycle engine's perspective;
/// the engine only consults the prescription policy, price, and stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    /// Unique medicine ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Whether a doctor's prescription must accompany a request
    pub prescription_required: bool,
    /// Category name
    pub category: String,
    /// Image reference
    pub image: Option<String>,
    /// Units in stock
    pub stock: i64,
    /// Manufacturer name
    pub manufacturer: String,
    /// Dosage description (e.g., "500mg")
    pub dosage: Option<String>,
    /// Dosage form (e.g., "Tablet", "Syrup")
    pub form: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Medicine {
    /// Create a new medicine with required fields and catalog defaults.
    pub fn new(name: String, description: String, price: f64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            price,
            prescription_required: false,
            category: "General".into(),
            image: None,
            stock: 0,
            manufacturer: "Unknown".into(),
            dosage: None,
            form: "Tablet".into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Low-stock threshold used by the dashboard report.
    pub fn is_low_stock(&self) -> bool {
        self.stock < 10
    }
}
