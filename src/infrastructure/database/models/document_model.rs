use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;

use crate::domain::entities::{Document, NewDocument};
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub text: String,
    pub metadata: serde_json::Value,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub text: String,
    pub metadata: serde_json::Value,
}

impl From<&NewDocument> for NewDocumentModel {
    fn from(doc: &NewDocument) -> Self {
        Self {
            id: doc.id.clone(),
            source: doc.source.clone(),
            title: doc.title.clone(),
            text: doc.text.clone(),
            metadata: doc.metadata.clone(),
        }
    }
}

impl From<DocumentModel> for Document {
    fn from(model: DocumentModel) -> Self {
        Document::new(
            model.id,
            model.source,
            model.title,
            model.text,
            model.metadata,
            model.created_at,
        )
    }
}
