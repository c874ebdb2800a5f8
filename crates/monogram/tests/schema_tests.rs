//! End-to-end document tests that run without a server

use bson::oid::ObjectId;
use bson::{doc, Bson};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use monogram::{
    ConnectionManager, ConnectionSettings, Document, Field, FieldType, FieldValidator, IndexSpec,
    MonogramError, Repository, Schema,
};

static ARTICLE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::builder("articles-test", "articles")
        .field(Field::new("title", FieldType::string()).required())
        .field(Field::new("author_email", FieldType::string()).validator(FieldValidator::Email))
        .field(
            Field::new("state", FieldType::string())
                .choices(["draft", "published"])
                .default_value("draft"),
        )
        .field(Field::new("views", FieldType::int()))
        .field(Field::new("published_at", FieldType::DateTime))
        .index(IndexSpec::ascending("title").unique())
        .index(IndexSpec::descending("published_at"))
        .build()
});

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Article {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_email: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    views: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_at: Option<bson::DateTime>,
}

impl Document for Article {
    fn schema() -> &'static Schema {
        &ARTICLE_SCHEMA
    }
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

fn article(title: &str) -> Article {
    Article {
        id: None,
        title: title.to_string(),
        author_email: None,
        state: None,
        views: None,
        published_at: None,
    }
}

#[test]
fn validate_catches_bad_values() {
    let mut a = article("hello");
    assert!(a.validate().is_ok());

    a.author_email = Some("not-an-email".into());
    let err = a.validate().unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("author_email"));

    a.author_email = Some("author@example.com".into());
    a.state = Some("archived".into());
    let err = a.validate().unwrap_err();
    assert!(err.to_string().contains("state"));
}

#[test]
fn wire_round_trip_applies_defaults() {
    let mut a = article("hello");
    a.id = Some(ObjectId::new());
    a.views = Some(12);

    let wire = a.to_wire().unwrap();
    // Nulls are dropped on the way out.
    assert!(!wire.contains_key("state"));

    let back = Article::from_wire(wire).unwrap();
    assert_eq!(back.id, a.id);
    assert_eq!(back.title, "hello");
    assert_eq!(back.views, Some(12));
    // from_wire fills the declared default.
    assert_eq!(back.state.as_deref(), Some("draft"));
}

#[test]
fn json_projection_and_parse() {
    let mut a = article("hello");
    let id = ObjectId::new();
    a.id = Some(id);

    let json = a.to_json().unwrap();
    assert_eq!(json["id"], serde_json::json!(id.to_hex()));
    assert!(json.get("_id").is_none());
    assert_eq!(json["title"], serde_json::json!("hello"));

    let parsed = Article::from_json(&serde_json::json!({
        "id": id.to_hex(),
        "title": "hello",
        "published_at": "2024-06-01T10:30:00Z",
    }))
    .unwrap();
    assert_eq!(parsed.id, Some(id));
    assert!(parsed.published_at.is_some());
    assert_eq!(parsed.state.as_deref(), Some("draft"));

    let err = Article::from_json(&serde_json::json!({ "state": "draft" })).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("title"));
}

#[test]
fn from_json_rejects_wrong_types() {
    let err = Article::from_json(&serde_json::json!({ "title": "t", "views": "many" }))
        .unwrap_err();
    assert!(err.to_string().contains("views"));
}

#[test]
fn find_query_builder_holds_filter() {
    let repo = Repository::<Article>::new();
    let query = repo
        .find(doc! { "state": "published" })
        .sort(doc! { "published_at": -1 })
        .skip(10)
        .limit(5);
    assert_eq!(query.filter(), &doc! { "state": "published" });
}

#[tokio::test]
async fn remove_without_id_fails() {
    // Fails on the missing identity before any connection lookup.
    let a = article("hello");
    let err = a.remove().await.unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("_id"));

    let repo = Repository::<Article>::new();
    let err = repo.remove(&a).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn repository_without_connection_errors() {
    // The alias is never registered, so collection resolution fails before
    // any network activity.
    let repo = Repository::<Article>::new();
    let err = repo.find_one(doc! {}).await.unwrap_err();
    assert!(matches!(err, MonogramError::Connection(_)));
}

#[tokio::test]
async fn alias_resolves_after_connect() {
    // A dedicated alias, so the never-registered "articles-test" alias used
    // by the error test above stays unregistered.
    ConnectionManager::connect_alias(
        "articles-conn",
        &ConnectionSettings::new("mongodb://localhost:27017/articles"),
    )
    .await
    .unwrap();
    assert!(ConnectionManager::is_connected("articles-conn"));
    assert_eq!(
        ConnectionManager::get("articles-conn").unwrap().database_name(),
        "articles"
    );
    ConnectionManager::disconnect("articles-conn");
}

#[test]
fn declared_indexes_have_stable_names() {
    let names: Vec<_> = Article::schema()
        .indexes()
        .iter()
        .map(|spec| spec.name())
        .collect();
    assert_eq!(names, ["title_1", "published_at_-1"]);
}

#[test]
fn bson_default_surfaces_as_null_until_filled() {
    // state uses #[serde(default)] so a missing slot deserializes to None,
    // mirroring how an absent field reads back before defaults applied.
    let a: Article = bson::from_document(doc! { "_id": ObjectId::new(), "title": "t" }).unwrap();
    assert!(a.state.is_none());
}
