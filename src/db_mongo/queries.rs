use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::{Collection, bson::{Document, doc}};
use std::sync::Arc;

use super::MongoConnection;
use super::models::*;

pub const COURSES_COLLECTION: &str = "courses";

/// Storage seam for the course endpoints.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>>;

    /// `$set` the given fields on the course with this id. Never upserts.
    async fn set_fields(&self, id: CourseId, fields: Document) -> Result<UpdateSummary>;

    async fn delete_by_id(&self, id: CourseId) -> Result<DeleteSummary>;

    async fn ping(&self) -> Result<()>;
}

pub struct MongoCourseStore {
    connection: Arc<MongoConnection>,
}

impl MongoCourseStore {
    pub fn new(connection: Arc<MongoConnection>) -> Self {
        Self { connection }
    }

    async fn collection(&self) -> Result<Collection<Document>> {
        let db = self.connection.database().await?;
        Ok(db.collection::<Document>(COURSES_COLLECTION))
    }
}

#[async_trait]
impl CourseStore for MongoCourseStore {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>> {
        let collection = self.collection().await?;

        let found = collection
            .find_one(doc! { "id": id })
            .await
            .with_context(|| format!("Failed to query course {}", id))?;

        found.map(Course::try_from).transpose()
    }

    async fn set_fields(&self, id: CourseId, fields: Document) -> Result<UpdateSummary> {
        let collection = self.collection().await?;

        let result = collection
            .update_one(doc! { "id": id }, doc! { "$set": fields })
            .await
            .with_context(|| format!("Failed to update course {}", id))?;

        Ok(result.into())
    }

    async fn delete_by_id(&self, id: CourseId) -> Result<DeleteSummary> {
        let collection = self.collection().await?;

        let result = collection
            .delete_one(doc! { "id": id })
            .await
            .with_context(|| format!("Failed to delete course {}", id))?;

        Ok(result.into())
    }

    async fn ping(&self) -> Result<()> {
        let db = self.connection.database().await?;
        db.run_command(doc! { "ping": 1 })
            .await
            .context("Failed to ping MongoDB")?;
        Ok(())
    }
}
