use crate::config::db::MongoConfig;
use mongodb::Client as MongoClient;
use mongodb::Database;
use mongodb::IndexModel;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;

#[derive(Debug, Clone)]
pub struct InfraClients {
    pub mongo_db: Database,
}

pub const COURSES_COLLECTION: &str = "courses";
pub const ENROLLMENTS_COLLECTION: &str = "enrollment_requests";
pub const PAYMENT_TRACKING_COLLECTION: &str = "payment_status_tracking";
pub const COURSE_AUDIT_COLLECTION: &str = "course_audit_logs";

pub async fn init_infra(mongo: &MongoConfig) -> Result<InfraClients, String> {
    let mongo_client = MongoClient::with_uri_str(&mongo.url)
        .await
        .map_err(|e| format!("mongodb client init failed: {e}"))?;
    let mongo_db = mongo_client.database(&mongo.database);
    ensure_indexes(&mongo_db).await?;
    Ok(InfraClients { mongo_db })
}

async fn ensure_indexes(db: &Database) -> Result<(), String> {
    let unique = IndexOptions::builder().unique(true).build();

    create_indexes(
        db,
        COURSES_COLLECTION,
        vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(unique.clone())
                .build(),
            IndexModel::builder().keys(doc! { "owner_id": 1 }).build(),
        ],
    )
    .await?;

    // One enrollment request per (user, course) pair.
    create_indexes(
        db,
        ENROLLMENTS_COLLECTION,
        vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(unique.clone())
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "course_id": 1 })
                .options(unique.clone())
                .build(),
        ],
    )
    .await?;

    create_indexes(
        db,
        PAYMENT_TRACKING_COLLECTION,
        vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(unique.clone())
                .build(),
            IndexModel::builder()
                .keys(doc! { "enrollment_id": 1 })
                .options(unique.clone())
                .build(),
        ],
    )
    .await?;

    create_indexes(
        db,
        COURSE_AUDIT_COLLECTION,
        vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(unique)
                .build(),
            IndexModel::builder()
                .keys(doc! { "course": 1, "timestamp": -1 })
                .build(),
        ],
    )
    .await
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), String> {
    db.collection::<mongodb::bson::Document>(collection)
        .create_indexes(indexes)
        .await
        .map_err(|e| format!("mongodb index creation failed for {collection}: {e}"))?;
    Ok(())
}
