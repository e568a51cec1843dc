use crate::models::{Category, CategoryId, NotBlankTrimmedString};
use crate::storage::records::CategoryRecord;

use super::MappingError;

pub fn to_domain(record: &CategoryRecord) -> Result<Category, MappingError> {
    let name = NotBlankTrimmedString::new(&record.name)
        .map_err(MappingError::invalid(record.id, "name"))?;

    Ok(Category {
        id: CategoryId::from_uuid(record.id),
        name,
        color: record.color,
        icon: record.icon.clone(),
        order_num: record.order_num,
        removed: record.is_deleted,
        last_updated: record.last_updated.unwrap_or_default(),
    })
}

pub fn to_record(category: &Category) -> CategoryRecord {
    CategoryRecord {
        id: *category.id.as_uuid(),
        name: category.name.as_str().to_string(),
        color: category.color,
        icon: category.icon.clone(),
        order_num: category.order_num,
        is_deleted: category.removed,
        last_updated: Some(category.last_updated),
    }
}
