use async_trait::async_trait;
use diesel::prelude::*;
use pgvector::{Vector, VectorExpressionMethods};

use crate::domain::entities::{Document, NewDocument, RetrievedDoc};
use crate::domain::repositories::DocumentRepository;
use crate::domain::repositories::document_repository::DocumentRepositoryError;
use crate::infrastructure::database::models::{DocumentModel, NewDocumentModel};
use crate::infrastructure::database::schema::documents::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn find_nearest(
        &self,
        query_embedding: &[f32],
        k: i64,
        probes: u32,
    ) -> Result<Vec<RetrievedDoc>, DocumentRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        // Session-scoped ivfflat recall tuning; SET accepts no bind
        // parameters and `probes` is numeric, so format! is safe here.
        diesel::sql_query(format!("SET ivfflat.probes = {}", probes))
            .execute(&mut conn)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        let query_vector = Vector::from(query_embedding.to_vec());

        let rows: Vec<(DocumentModel, f64)> = documents
            .filter(embedding.is_not_null())
            .select((
                DocumentModel::as_select(),
                embedding.cosine_distance(query_vector.clone()).assume_not_null(),
            ))
            .order(embedding.cosine_distance(query_vector))
            .limit(k)
            .load(&mut conn)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(model, distance)| RetrievedDoc {
                id: model.id,
                source: model.source,
                title: model.title,
                text: model.text,
                score: distance,
            })
            .collect())
    }

    async fn upsert_document(&self, doc: &NewDocument) -> Result<bool, DocumentRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        let model = NewDocumentModel::from(doc);

        let inserted = diesel::insert_into(documents)
            .values(&model)
            .on_conflict(id)
            .do_nothing()
            .execute(&mut conn)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(inserted > 0)
    }

    async fn set_embedding(
        &self,
        document_id: &str,
        vector: &[f32],
    ) -> Result<(), DocumentRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        diesel::update(documents.find(document_id))
            .set(embedding.eq(Some(Vector::from(vector.to_vec()))))
            .execute(&mut conn)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_unembedded(
        &self,
        limit: i64,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        let models = documents
            .filter(embedding.is_null())
            .order(created_at.asc())
            .limit(limit)
            .select(DocumentModel::as_select())
            .load::<DocumentModel>(&mut conn)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(
        &self,
        document_id: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        let model = documents
            .find(document_id)
            .select(DocumentModel::as_select())
            .first::<DocumentModel>(&mut conn)
            .optional()
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(model.map(Document::from))
    }
}
