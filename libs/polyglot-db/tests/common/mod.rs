#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use polyglot_db::{FieldValues, LanguageCtx, TranslationManager};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

pub mod book {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "book")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub isbn: String,
        pub price: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::book_translation::Entity")]
        Translations,
    }

    impl Related<super::book_translation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Translations.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod book_translation {
    use polyglot_db::Translatable;
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel, Translatable)]
    #[sea_orm(table_name = "book_translation")]
    #[translatable(shared = "super::book::Entity")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub master_id: i32,
        pub language_code: String,
        pub title: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::book::Entity",
            from = "Column::MasterId",
            to = "super::book::Column::Id"
        )]
        Book,
    }

    impl Related<super::book::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Book.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub type Books = TranslationManager<book_translation::Entity>;

/// Fresh in-memory database with the book tables created.
pub async fn setup() -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to database");
    db.execute_unprepared(
        "CREATE TABLE book (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            isbn TEXT NOT NULL,
            price INTEGER NOT NULL
        )",
    )
    .await
    .expect("Failed to create book table");
    db.execute_unprepared(
        "CREATE TABLE book_translation (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            master_id INTEGER NOT NULL REFERENCES book (id),
            language_code TEXT NOT NULL,
            title TEXT NOT NULL,
            UNIQUE (master_id, language_code)
        )",
    )
    .await
    .expect("Failed to create book_translation table");
    db
}

/// Create a book with an English title and return its shared id.
pub async fn seed_book(db: &DatabaseConnection, isbn: &str, price: i32, title: &str) -> i32 {
    let created = Books::new()
        .query(&LanguageCtx::new("en"))
        .create(
            db,
            FieldValues::new()
                .set("isbn", isbn)
                .set("price", price)
                .set("title", title),
        )
        .await
        .expect("Failed to seed book");
    created.shared().id
}

/// Add a translation in `language` to an existing book.
pub async fn seed_translation(db: &DatabaseConnection, master: i32, language: &str, title: &str) {
    Books::new()
        .query(&LanguageCtx::new("en"))
        .create(
            db,
            FieldValues::new()
                .set("master", master)
                .set("language_code", language)
                .set("title", title),
        )
        .await
        .expect("Failed to seed translation");
}
