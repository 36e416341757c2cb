use super::Resource;
use document_hydrator::{Entity, FieldTable};
use std::sync::OnceLock;

/// A post or comment author.
///
/// Some endpoints serve authors as `people`; those are declared under the alias class
/// [`Author::PERSON_CLASS`] and land in the same repository.
#[derive(Debug, Default)]
pub struct Author {
    pub resource: Resource,
    pub name: String,
    pub email: Option<String>,
}

impl Author {
    pub const PERSON_CLASS: &'static str = "Blog.Person";
}

impl Entity for Author {
    const CLASS: &'static str = "Blog.Author";

    fn identifier(&self) -> Option<&str> {
        self.resource.id.as_deref()
    }

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Author>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::new()
                .inherit(Resource::fields(), |a: &mut Author| &mut a.resource)
                .field("name", |a: &mut Author| &mut a.name)
                .field("email", |a: &mut Author| &mut a.email)
        })
    }
}
