//! Category and tag display formatting

use crate::models::{Category, Tag};

pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }

    let mut output = String::new();
    for (position, category) in categories.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {:<24} #{:06x}  {}\n",
            position + 1,
            category.name.as_str(),
            category.color & 0x00ff_ffff,
            category.id
        ));
    }
    output
}

pub fn format_tag_list(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "No tags found.".to_string();
    }

    let mut output = String::new();
    for tag in tags {
        output.push_str(&format!(
            "#{:<24} {}  created {}\n",
            tag.name.as_str(),
            tag.id,
            tag.creation_timestamp.format("%Y-%m-%d")
        ));
    }
    output
}
