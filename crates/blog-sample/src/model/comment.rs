use super::{Author, Post, Resource};
use document_hydrator::{Entity, FieldTable, Handle};
use std::sync::OnceLock;

/// A reader comment on a [`Post`].
#[derive(Debug, Default)]
pub struct Comment {
    pub resource: Resource,
    pub body: String,
    pub post: Option<Handle<Post>>,
    pub author: Option<Handle<Author>>,
}

impl Entity for Comment {
    const CLASS: &'static str = "Blog.Comment";

    fn identifier(&self) -> Option<&str> {
        self.resource.id.as_deref()
    }

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Comment>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::new()
                .inherit(Resource::fields(), |c: &mut Comment| &mut c.resource)
                .field("body", |c: &mut Comment| &mut c.body)
                .to_one("post", |c: &mut Comment, post| c.post = post)
                .to_one("author", |c: &mut Comment, author| c.author = author)
        })
    }
}
