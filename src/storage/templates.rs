//! Report template store

use uuid::Uuid;

use crate::error::WalletResult;
use crate::reports::ReportTemplate;

use super::table::Table;

pub struct TemplateStore {
    table: Box<dyn Table<ReportTemplate>>,
}

impl TemplateStore {
    pub fn new(table: Box<dyn Table<ReportTemplate>>) -> Self {
        Self { table }
    }

    /// All templates sorted by name (case-insensitive)
    pub fn list(&self) -> WalletResult<Vec<ReportTemplate>> {
        let mut templates = self.table.find_all()?;
        templates.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(templates)
    }

    pub fn find_by_name(&self, name: &str) -> WalletResult<Option<ReportTemplate>> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .table
            .find_all()?
            .into_iter()
            .find(|t| t.name.to_lowercase() == name_lower))
    }

    /// Save a template. A template with the same name is replaced and keeps
    /// its id.
    pub fn save(&self, mut template: ReportTemplate) -> WalletResult<ReportTemplate> {
        if let Some(existing) = self.find_by_name(&template.name)? {
            template.id = existing.id;
        }
        self.table.save(template.clone())?;
        tracing::debug!(name = %template.name, "report template saved");
        Ok(template)
    }

    /// Returns whether a template was removed
    pub fn delete_by_id(&self, id: Uuid) -> WalletResult<bool> {
        if self.table.find_by_id(id)?.is_none() {
            return Ok(false);
        }
        self.table.delete_by_id(id)?;
        Ok(true)
    }
}
