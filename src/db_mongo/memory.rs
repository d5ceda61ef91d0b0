//! In-process `CourseStore` used by the handler tests.

use anyhow::{Result, bail};
use async_trait::async_trait;
use mongodb::bson::{Document, oid::ObjectId};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::models::*;
use super::queries::CourseStore;

#[derive(Default)]
pub struct MemoryCourseStore {
    docs: Mutex<Vec<Document>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryCourseStore {
    pub fn with_courses(courses: Vec<Course>) -> Self {
        let docs = courses
            .into_iter()
            .map(|course| {
                let mut doc = Document::new();
                doc.insert("_id", ObjectId::new());
                doc.extend(course.into_document());
                doc
            })
            .collect();

        Self::with_documents(docs)
    }

    /// Seed raw documents, stored as given.
    pub fn with_documents(docs: Vec<Document>) -> Self {
        Self {
            docs: Mutex::new(docs),
            ..Default::default()
        }
    }

    /// Make every following call fail as if the connection dropped.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    pub fn raw(&self, id: CourseId) -> Option<Document> {
        self.docs
            .lock()
            .unwrap()
            .iter()
            .find(|doc| course_id_of(doc) == Some(id))
            .cloned()
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            bail!("connection closed by peer");
        }
        Ok(())
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>> {
        self.enter()?;
        self.raw(id).map(Course::try_from).transpose()
    }

    async fn set_fields(&self, id: CourseId, fields: Document) -> Result<UpdateSummary> {
        self.enter()?;
        if fields.is_empty() {
            bail!("'$set' is empty. You must specify a field like so: {{$set: {{<field>: ...}}}}");
        }

        let mut docs = self.docs.lock().unwrap();
        let Some(doc) = docs.iter_mut().find(|doc| course_id_of(doc) == Some(id)) else {
            return Ok(UpdateSummary::new(0, 0));
        };

        let mut modified = false;
        for (key, value) in fields {
            if doc.get(&key) != Some(&value) {
                doc.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateSummary::new(1, u64::from(modified)))
    }

    async fn delete_by_id(&self, id: CourseId) -> Result<DeleteSummary> {
        self.enter()?;
        let mut docs = self.docs.lock().unwrap();
        let position = docs.iter().position(|doc| course_id_of(doc) == Some(id));

        let deleted_count = match position {
            Some(index) => {
                docs.remove(index);
                1
            }
            None => 0,
        };

        Ok(DeleteSummary { deleted_count })
    }

    async fn ping(&self) -> Result<()> {
        self.enter()
    }
}
