//! Data source registry
//!
//! Ordered, id-keyed collection of [`DataSource`]s. The registry never drops
//! below one entry; which entry is "selected" is the caller's concern.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{DataSource, DataSourcePatch, NewDataSource};
use crate::validation::{
    validate_data_source_name, validate_field_name, validate_hex_color, validate_threshold_value,
};

/// Message carried by the invariant violation raised when removing the last entry
pub const KEEP_ONE_MESSAGE: &str = "must keep at least one data source";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegistryEntries")]
pub struct DataSourceRegistry {
    entries: Vec<DataSource>,
}

/// Unchecked wire form; deserialization goes through [`DataSourceRegistry::from_entries`]
#[derive(Deserialize)]
struct RegistryEntries {
    entries: Vec<DataSource>,
}

impl TryFrom<RegistryEntries> for DataSourceRegistry {
    type Error = DomainError;

    fn try_from(raw: RegistryEntries) -> Result<Self, Self::Error> {
        Self::from_entries(raw.entries)
    }
}

impl Default for DataSourceRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

impl DataSourceRegistry {
    /// Registry holding the default temperature source
    pub fn seeded() -> Self {
        Self {
            entries: vec![DataSource::default_temperature()],
        }
    }

    /// Build a registry from existing entries; at least one is required
    pub fn from_entries(entries: Vec<DataSource>) -> DomainResult<Self> {
        if entries.is_empty() {
            return Err(DomainError::InvariantViolation(KEEP_ONE_MESSAGE.to_string()));
        }
        Ok(Self { entries })
    }

    /// Validate and append a new source with a fresh id
    pub fn add(&mut self, input: NewDataSource) -> DomainResult<DataSource> {
        validate_data_source_name(&input.name).map_err(|m| DomainError::validation("name", m))?;
        validate_field_name(&input.field).map_err(|m| DomainError::validation("field", m))?;
        validate_hex_color(&input.color).map_err(|m| DomainError::validation("color", m))?;
        validate_threshold_value(input.value).map_err(|m| DomainError::validation("value", m))?;

        let source = DataSource {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            field: input.field,
            color: input.color,
            operator: input.operator,
            value: input.value,
            active: true,
        };
        self.entries.push(source.clone());
        Ok(source)
    }

    /// Apply a partial update. Unknown ids are tolerated and yield `Ok(None)`
    /// without validating the patch.
    pub fn update(&mut self, id: &str, patch: DataSourcePatch) -> DomainResult<Option<DataSource>> {
        let Some(source) = self.entries.iter_mut().find(|ds| ds.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            validate_data_source_name(name).map_err(|m| DomainError::validation("name", m))?;
        }
        if let Some(field) = &patch.field {
            validate_field_name(field).map_err(|m| DomainError::validation("field", m))?;
        }
        if let Some(color) = &patch.color {
            validate_hex_color(color).map_err(|m| DomainError::validation("color", m))?;
        }
        if let Some(value) = patch.value {
            validate_threshold_value(value).map_err(|m| DomainError::validation("value", m))?;
        }

        if let Some(name) = patch.name {
            source.name = name.trim().to_string();
        }
        if let Some(field) = patch.field {
            source.field = field;
        }
        if let Some(color) = patch.color {
            source.color = color;
        }
        if let Some(operator) = patch.operator {
            source.operator = operator;
        }
        if let Some(value) = patch.value {
            source.value = value;
        }
        if let Some(active) = patch.active {
            source.active = active;
        }

        Ok(Some(source.clone()))
    }

    /// Remove a source. Fails when it would empty the registry; unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> DomainResult<Option<DataSource>> {
        if self.entries.len() <= 1 {
            return Err(DomainError::InvariantViolation(KEEP_ONE_MESSAGE.to_string()));
        }

        match self.entries.iter().position(|ds| ds.id == id) {
            Some(idx) => Ok(Some(self.entries.remove(idx))),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> &[DataSource] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&DataSource> {
        self.entries.iter().find(|ds| ds.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// First entry; always present
    pub fn first(&self) -> &DataSource {
        &self.entries[0]
    }

    /// Entry to select after `removed_id` is gone: the first remaining one
    pub fn fallback_for(&self, removed_id: &str) -> &DataSource {
        self.entries
            .iter()
            .find(|ds| ds.id != removed_id)
            .unwrap_or_else(|| self.first())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
