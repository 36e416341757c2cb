use crate::clients::{AuthorClient, PostClient};
use crate::model::{Author, Comment, Post};
use document_hydrator::{
    ClassRegistry, DataStore, Entity, Hydrator, RawStorage, Repository, RepositoryRegistry, StoreConfig, Transport,
};
use std::sync::Arc;
use tracing::info;

/// The blog domain wired into a [`DataStore`].
#[derive(Clone)]
pub struct BlogSystem {
    pub post_client: PostClient,
    pub author_client: AuthorClient,
    pub posts: Arc<Repository<Post>>,
    pub comments: Arc<Repository<Comment>>,
    pub authors: Arc<Repository<Author>>,
    store: DataStore,
}

impl BlogSystem {
    /// Base path the clients build their URIs on.
    pub const API_BASE: &'static str = "/api";

    pub fn new(storage: RawStorage, transport: Arc<dyn Transport>) -> Self {
        let repositories = RepositoryRegistry::new();
        let posts = repositories.register(Repository::<Post>::new());
        let comments = repositories.register(Repository::<Comment>::new());
        let authors = repositories.register(Repository::<Author>::with_names([Author::CLASS, Author::PERSON_CLASS]));

        let hydrator = Hydrator::new(Arc::new(Self::classes()), Arc::new(repositories));
        let store = DataStore::new(hydrator, storage, transport);
        info!(durable = store.storage().is_durable(), "Blog system ready");

        Self {
            post_client: PostClient::new(store.clone(), Self::API_BASE),
            author_client: AuthorClient::new(store.clone(), Self::API_BASE),
            posts,
            comments,
            authors,
            store,
        }
    }

    /// A system caching in memory only.
    pub fn in_memory(transport: Arc<dyn Transport>) -> Self {
        Self::new(RawStorage::in_memory(StoreConfig::default()), transport)
    }

    /// Every resource name the blog API uses.
    pub fn classes() -> ClassRegistry {
        let mut classes = ClassRegistry::new();
        classes
            .bind::<Post>("posts")
            .register("post", Post::CLASS)
            .bind::<Comment>("comments")
            .register("comment", Comment::CLASS)
            .bind::<Author>("authors")
            .register("author", Author::CLASS)
            .declare_as::<Author>(Author::PERSON_CLASS)
            .register("people", Author::PERSON_CLASS)
            .register("person", Author::PERSON_CLASS);
        classes
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn hydrator(&self) -> &Hydrator {
        self.store.hydrator()
    }
}
