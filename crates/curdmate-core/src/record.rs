//! Record API trait definition.

use curdmate_types::error::RecordApiError;
use curdmate_types::record::{NewRecord, Record, RecordId, RecordPage, RecordPatch, RecordQuery};

/// Port to the backend record store.
///
/// Implementations live in curdmate-infra (e.g., `HttpRecordApi`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait RecordApi: Send + Sync {
    /// List or search records, one page at a time.
    fn list(
        &self,
        query: &RecordQuery,
    ) -> impl std::future::Future<Output = Result<RecordPage, RecordApiError>> + Send;

    /// Fetch one record. A missing id is `RecordApiError::NotFound`.
    fn get(
        &self,
        id: &RecordId,
    ) -> impl std::future::Future<Output = Result<Record, RecordApiError>> + Send;

    /// Create a record. Returns the stored record with its new id.
    fn create(
        &self,
        record: &NewRecord,
    ) -> impl std::future::Future<Output = Result<Record, RecordApiError>> + Send;

    /// Apply `patch` to an existing record.
    fn update(
        &self,
        id: &RecordId,
        patch: &RecordPatch,
    ) -> impl std::future::Future<Output = Result<(), RecordApiError>> + Send;

    /// Permanently delete a record.
    fn delete(
        &self,
        id: &RecordId,
    ) -> impl std::future::Future<Output = Result<(), RecordApiError>> + Send;
}
