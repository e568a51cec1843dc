use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AssociationId, NotBlankTrimmedString, Tag, TagId};
use crate::storage::records::{TagAssociationRecord, TagRecord};

use super::MappingError;

pub fn to_domain(record: &TagRecord) -> Result<Tag, MappingError> {
    let name = NotBlankTrimmedString::new(&record.name)
        .map_err(MappingError::invalid(record.id, "name"))?;

    Ok(Tag {
        id: TagId::from_uuid(record.id),
        name,
        color: record.color,
        creation_timestamp: record.created_at,
        removed: record.is_deleted,
        last_updated: record.last_updated.unwrap_or(record.created_at),
    })
}

pub fn to_record(tag: &Tag) -> TagRecord {
    TagRecord {
        id: *tag.id.as_uuid(),
        name: tag.name.as_str().to_string(),
        color: tag.color,
        created_at: tag.creation_timestamp,
        is_deleted: tag.removed,
        last_updated: Some(tag.last_updated),
    }
}

/// A fresh association row linking `tag` to `associated`
pub fn association_record(
    tag: TagId,
    associated: AssociationId,
    synced_at: DateTime<Utc>,
) -> TagAssociationRecord {
    TagAssociationRecord {
        id: Uuid::new_v4(),
        tag_id: *tag.as_uuid(),
        associated_id: *associated.as_uuid(),
        last_synced: synced_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tag = Tag::new(NotBlankTrimmedString::new("vacation").unwrap());
        assert_eq!(to_domain(&to_record(&tag)).unwrap(), tag);
    }

    #[test]
    fn test_missing_last_updated_falls_back_to_creation() {
        let tag = Tag::new(NotBlankTrimmedString::new("work").unwrap());
        let mut record = to_record(&tag);
        record.last_updated = None;

        let back = to_domain(&record).unwrap();
        assert_eq!(back.last_updated, tag.creation_timestamp);
    }

    #[test]
    fn test_association_record_links_ids() {
        let tag = TagId::new();
        let target = AssociationId::new();
        let record = association_record(tag, target, Utc::now());

        assert_eq!(record.tag_id, *tag.as_uuid());
        assert_eq!(record.associated_id, *target.as_uuid());
    }
}
