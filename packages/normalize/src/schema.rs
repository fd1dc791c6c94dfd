//! Per-column normalization schema.
//!
//! Enumerates, per KPI column, the unit text to strip before casting to
//! `f64`, plus the raw fields deliberately excluded from the output.
//! [`Schema::default`] mirrors the columns the observed source renders.

use serde::{Deserialize, Serialize};

/// One output column: the slugified KPI name and the unit text removed
/// before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Slugified field name, e.g. `"temperature-maximale"`.
    pub name: String,
    /// Unit text stripped from the raw value, e.g. `"°"`, `"%"`,
    /// `"km/h"`. `None` for unitless columns.
    pub unit: Option<String>,
}

/// The full normalization schema: required numeric columns plus raw
/// fields dropped outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Required numeric columns in output order. A row missing any of
    /// these, or failing to parse one, is dropped.
    pub columns: Vec<ColumnSpec>,
    /// Raw fields excluded from the output entirely (non-numeric
    /// descriptors such as the day-length field).
    pub drop_fields: Vec<String>,
}

impl Schema {
    /// An empty schema; build it up with [`Self::with_column`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            drop_fields: Vec::new(),
        }
    }

    /// Appends a required column with an optional unit to strip.
    #[must_use]
    pub fn with_column(mut self, name: &str, unit: Option<&str>) -> Self {
        self.columns.push(ColumnSpec {
            name: name.to_owned(),
            unit: unit.map(str::to_owned),
        });
        self
    }

    /// Marks a raw field as deliberately excluded from the output.
    #[must_use]
    pub fn with_dropped_field(mut self, name: &str) -> Self {
        self.drop_fields.push(name.to_owned());
        self
    }
}

impl Default for Schema {
    /// The schema of the observed source's day pages.
    fn default() -> Self {
        Self::new()
            .with_column("temperature-maximale", Some("°"))
            .with_column("temperature-minimale", Some("°"))
            .with_column("humidite", Some("%"))
            .with_column("couverture-nuageuse", Some("%"))
            .with_column("pression", Some("hPa"))
            .with_column("precipitations", Some("mm"))
            .with_column("vitesse-vent", Some("km/h"))
            .with_column("point-de-rosee", Some("°C"))
            .with_column("visibilite", Some("km"))
            .with_column("indice-de-chaleur", None)
            .with_dropped_field("duree-du-jour")
    }
}
