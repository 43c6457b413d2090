use serde::{Deserialize, Serialize};

use crate::codec::{get_number, get_string, number_value, string_value, Record};
use crate::storage::{AttributeType, Item, KeyAttribute, KeySchema, Result};

/// Partition key attribute.
pub const ID_ATTRIBUTE: &str = "id";
/// Sort key attribute.
pub const NAME_ATTRIBUTE: &str = "name";

/// A keyboard in the catalog.
///
/// `(id, name)` is the composite key: `id` is stored as a number and
/// partitions the table, `name` sorts within a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyboard {
    pub id: String,
    pub name: String,
}

impl Keyboard {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Record for Keyboard {
    const ENTITY_TYPE: &'static str = "Keyboard";

    fn key_schema() -> KeySchema {
        KeySchema {
            partition_key: KeyAttribute::new(ID_ATTRIBUTE, AttributeType::Number),
            sort_key: Some(KeyAttribute::new(NAME_ATTRIBUTE, AttributeType::String)),
        }
    }

    fn attribute_names() -> Vec<&'static str> {
        vec![ID_ATTRIBUTE, NAME_ATTRIBUTE]
    }

    fn encode_key(&self) -> Result<Item> {
        let mut item = Item::new();
        item.insert(ID_ATTRIBUTE.to_string(), number_value(ID_ATTRIBUTE, &self.id)?);
        item.insert(NAME_ATTRIBUTE.to_string(), string_value(&self.name));
        Ok(item)
    }

    fn encode_full(&self) -> Result<Item> {
        // No attributes outside the key yet.
        self.encode_key()
    }

    fn decode_item(item: &Item) -> Result<Self> {
        Ok(Self {
            id: get_number(item, ID_ATTRIBUTE)?,
            name: get_string(item, NAME_ATTRIBUTE)?,
        })
    }

    fn key_display(&self) -> String {
        format!("{}#{}", self.id, self.name)
    }
}
