use crate::domain::errors::TransportError;
use crate::domain::row::Row;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote sink accepting a batch of rows.
#[async_trait]
pub trait SeriesWriter: Send + Sync {
    async fn write_series(&self, rows: &[Row]) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: SeriesWriter + ?Sized> SeriesWriter for Arc<T> {
    async fn write_series(&self, rows: &[Row]) -> Result<(), TransportError> {
        (**self).write_series(rows).await
    }
}
