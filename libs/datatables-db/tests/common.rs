#![allow(dead_code)]
use anyhow::Result;
use datatables_db::{FieldKind, FieldMap};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};

pub mod person {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "people")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub name: String,
        pub city: String,
        pub age: i64,
        pub active: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub fn person(id: i64, name: &str, city: &str, age: i64, active: bool) -> person::Model {
    person::Model {
        id,
        name: name.to_string(),
        city: city.to_string(),
        age,
        active,
    }
}

/// Ten rows; three names contain "smith" (1, 3, 6), four live in Paris.
pub fn people() -> Vec<person::Model> {
    vec![
        person(1, "Ann Smith", "Paris", 34, true),
        person(2, "Bob Jones", "Lyon", 28, true),
        person(3, "Carla Smithers", "Paris", 45, false),
        person(4, "Dan Brown", "Nice", 52, true),
        person(5, "Eve Adams", "Lyon", 23, false),
        person(6, "Frank Smith", "Nice", 39, true),
        person(7, "Gina Lopez", "Paris", 31, true),
        person(8, "Hugo Martin", "Lyon", 60, false),
        person(9, "Iris Chen", "Nice", 27, true),
        person(10, "Jack 50%_Off", "Paris", 41, true),
    ]
}

pub fn person_fields() -> FieldMap<person::Entity> {
    FieldMap::<person::Entity>::new()
        .insert("id", person::Column::Id, FieldKind::I64)
        .insert("name", person::Column::Name, FieldKind::String)
        .insert("city", person::Column::City, FieldKind::String)
        .insert("age", person::Column::Age, FieldKind::I64)
        .insert("active", person::Column::Active, FieldKind::Bool)
}

/// In-memory SQLite with the `people` table created and seeded.
pub async fn bring_up_sqlite() -> Result<DatabaseConnection> {
    // A single pooled connection keeps the in-memory database alive and shared.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(person::Entity)))
        .await?;

    person::Entity::insert_many(people().into_iter().map(person::ActiveModel::from))
        .exec(&db)
        .await?;

    Ok(db)
}
