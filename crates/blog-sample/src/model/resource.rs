use document_hydrator::document::identifier_of;
use document_hydrator::FieldTable;
use std::sync::OnceLock;

/// Properties every blog resource carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub id: Option<String>,
    pub created_at: Option<String>,
}

impl Resource {
    /// The base table inherited by [`Post`](super::Post), [`Comment`](super::Comment) and
    /// [`Author`](super::Author).
    ///
    /// Identifiers may arrive as numbers; they are stored in their decimal form.
    pub fn fields() -> &'static FieldTable<Resource> {
        static TABLE: OnceLock<FieldTable<Resource>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::new()
                .setter("id", |r: &mut Resource, value| {
                    r.id = identifier_of(value);
                    Ok(())
                })
                .field("created_at", |r: &mut Resource| &mut r.created_at)
        })
    }
}
