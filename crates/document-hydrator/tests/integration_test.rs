use chrono::{DateTime, TimeDelta, Utc};
use document_hydrator::mock::MockTransport;
use document_hydrator::{
    ClassRegistry, DataStore, Entity, FieldTable, FileStore, Handle, HydrationError, Hydrator, RawStorage, Repository,
    RepositoryRegistry, StoreConfig,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::{Arc, OnceLock};

// --- Test Entities ---

#[derive(Default, Debug)]
struct Record {
    id: Option<String>,
    revision: u32,
}

impl Record {
    fn table() -> &'static FieldTable<Record> {
        static TABLE: OnceLock<FieldTable<Record>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::new()
                .setter("id", |r: &mut Record, value| {
                    r.id = document_hydrator::document::identifier_of(value);
                    Ok(())
                })
                .field("revision", |r: &mut Record| &mut r.revision)
        })
    }
}

#[derive(Default, Debug)]
struct Shelf {
    record: Record,
    label: String,
    books: Vec<Option<Handle<Book>>>,
}

#[derive(Default, Debug)]
struct Book {
    record: Record,
    title: String,
    shelf: Option<Handle<Shelf>>,
}

impl Entity for Shelf {
    const CLASS: &'static str = "Library.Shelf";

    fn identifier(&self) -> Option<&str> {
        self.record.id.as_deref()
    }

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Shelf>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::new()
                .inherit(Record::table(), |s: &mut Shelf| &mut s.record)
                .field("label", |s: &mut Shelf| &mut s.label)
                .to_many("books", |s: &mut Shelf, books| s.books = books)
        })
    }
}

impl Entity for Book {
    const CLASS: &'static str = "Library.Book";

    fn identifier(&self) -> Option<&str> {
        self.record.id.as_deref()
    }

    fn fields() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Book>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::new()
                .inherit(Record::table(), |b: &mut Book| &mut b.record)
                .setter("title", |b: &mut Book, value| {
                    b.title = serde_json::from_value::<String>(value.clone())?.to_uppercase();
                    Ok(())
                })
                .to_one("shelf", |b: &mut Book, shelf| b.shelf = shelf)
        })
    }
}

struct Library {
    hydrator: Hydrator,
    shelves: Arc<Repository<Shelf>>,
    books: Arc<Repository<Book>>,
}

fn library() -> Library {
    let mut classes = ClassRegistry::new();
    classes
        .bind::<Shelf>("shelves")
        .register("shelf", Shelf::CLASS)
        .bind::<Book>("books")
        .register("book", Book::CLASS)
        .declare_as::<Book>("Library.Volume")
        .register("volumes", "Library.Volume");

    let repositories = RepositoryRegistry::new();
    let shelves = repositories.register(Repository::<Shelf>::new());
    let books = repositories.register(Repository::<Book>::with_names([Book::CLASS, "Library.Volume"]));

    Library {
        hydrator: Hydrator::new(Arc::new(classes), Arc::new(repositories)),
        shelves,
        books,
    }
}

fn library_document() -> serde_json::Value {
    json!({
        "shelves": [
            { "id": 1, "label": "Fiction", "rels": { "books": ["b2", "b1", "b404"] } }
        ],
        "books": [
            { "id": "b1", "title": "dune", "revision": 3, "rels": { "shelf": 1 } },
            { "id": "b2", "title": "emma", "isbn": "ignored", "rels": { "shelf": 1 } }
        ],
        "rels": {
            "shelves.books": { "type": "books" },
            "books.shelf": { "type": "shelf" }
        }
    })
}

// --- Tests ---

#[test]
fn test_hydrates_a_cyclic_graph_across_collections() {
    let lib = library();
    let document = lib.hydrator.hydrate_value(library_document()).unwrap();

    assert_eq!(document.resource_names().collect::<Vec<_>>(), vec!["shelves", "books"]);
    let shelf = document.many::<Shelf>("shelves").unwrap().remove(0);
    let books = document.many::<Book>("books").unwrap();

    let shelf_ref = shelf.read();
    assert_eq!(shelf_ref.record.id.as_deref(), Some("1"));
    assert_eq!(shelf_ref.books.len(), 3);
    assert!(shelf_ref.books[0].as_ref().unwrap().ptr_eq(&books[1]));
    assert!(shelf_ref.books[1].as_ref().unwrap().ptr_eq(&books[0]));
    assert!(shelf_ref.books[2].is_none());

    let dune = books[0].read();
    assert_eq!(dune.title, "DUNE");
    assert_eq!(dune.record.revision, 3);
    assert!(dune.shelf.as_ref().unwrap().ptr_eq(&shelf));
}

#[test]
fn test_identity_is_kept_across_documents_with_latest_values() {
    let lib = library();
    lib.hydrator.hydrate_value(library_document()).unwrap();
    let before = lib.books.find_by_identifier("b1").unwrap();

    let update = lib
        .hydrator
        .hydrate_value(json!({ "book": { "id": "b1", "title": "dune messiah", "revision": 4 } }))
        .unwrap();
    let after = update.one::<Book>("book").unwrap();

    assert!(before.ptr_eq(&after));
    assert_eq!(before.read().title, "DUNE MESSIAH");
    assert_eq!(before.read().record.revision, 4);
    assert_eq!(lib.books.len(), 2);
}

#[test]
fn test_unknown_resource_fails_before_anything_is_built() {
    let lib = library();
    let err = lib
        .hydrator
        .hydrate_value(json!({
            "books": [{ "id": "b1", "title": "dune" }],
            "magazines": [{ "id": "m1" }]
        }))
        .unwrap_err();

    assert!(matches!(err, HydrationError::UnknownResourceType(ref name) if name == "magazines"));
    assert!(lib.books.is_empty());
    assert!(lib.shelves.is_empty());
}

#[test]
fn test_alias_class_resolves_to_the_shared_repository() {
    let lib = library();
    let document = lib
        .hydrator
        .hydrate_value(json!({ "volumes": [{ "id": "v1", "title": "annals" }] }))
        .unwrap();

    let volume = document.many::<Book>("volumes").unwrap().remove(0);
    assert!(volume.ptr_eq(&lib.books.find_by_identifier("v1").unwrap()));
    let erased = lib.hydrator.repositories().repository_for("Library.Volume").unwrap();
    assert_eq!(erased.len(), 1);
}

#[tokio::test]
async fn test_durable_cache_expires_and_refetches() {
    let dir = tempfile::tempdir().unwrap();
    let now: Arc<Mutex<DateTime<Utc>>> = Arc::new(Mutex::new(Utc::now()));
    let clock = now.clone();
    let storage = RawStorage::durable(FileStore::open(dir.path()).unwrap(), StoreConfig::default())
        .with_clock(move || *clock.lock());

    let body = library_document().to_string();
    let mock = MockTransport::new();
    mock.expect_fetch("/library").return_json(body.clone());
    mock.expect_fetch("/library").return_json(body);

    let lib = library();
    let store = DataStore::new(lib.hydrator.clone(), storage, Arc::new(mock.clone()));

    store.get("/library").await.unwrap();
    *now.lock() += TimeDelta::minutes(4);
    store.get("/library").await.unwrap();
    assert_eq!(mock.call_count(), 1);

    *now.lock() += TimeDelta::minutes(2);
    let refreshed = store.get("/library").await.unwrap();
    assert_eq!(mock.call_count(), 2);
    assert_eq!(refreshed.instance_count(), 3);
    mock.verify();
}
