use super::{Author, Comment, Resource};
use document_hydrator::{Entity, FieldTable, Handle};
use serde::Serialize;
use std::sync::OnceLock;

/// A blog post.
///
/// # Field mapping
/// - `id`, `created_at` - inherited from [`Resource`]
/// - `title` - through [`Post::set_title`]
/// - `body`, `tags` - assigned directly
/// - `rels.author` - to-one [`Author`]
/// - `rels.comments` - to-many [`Comment`], in document order
#[derive(Debug, Default)]
pub struct Post {
    pub resource: Resource,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author: Option<Handle<Author>>,
    pub comments: Vec<Option<Handle<Comment>>>,
}

impl Post {
    /// Titles are stored without surrounding whitespace.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.trim().to_string();
    }

    /// The comments that resolved, skipping identifiers that were not loaded.
    pub fn loaded_comments(&self) -> impl Iterator<Item = &Handle<Comment>> {
        self.comments.iter().flatten()
    }
}

impl Entity for Post {
    const CLASS: &'static str = "Blog.Post";

    fn identifier(&self) -> Option<&str> {
        self.resource.id.as_deref()
    }

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Post>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::new()
                .inherit(Resource::fields(), |p: &mut Post| &mut p.resource)
                .setter("title", |p: &mut Post, value| {
                    p.set_title(&serde_json::from_value::<String>(value.clone())?);
                    Ok(())
                })
                .field("body", |p: &mut Post| &mut p.body)
                .field("tags", |p: &mut Post| &mut p.tags)
                .to_one("author", |p: &mut Post, author| p.author = author)
                .to_many("comments", |p: &mut Post, comments| p.comments = comments)
        })
    }
}

/// A post written locally and staged in the cache before the API knows about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDraft {
    pub id: String,
    pub title: String,
    pub body: String,
}
