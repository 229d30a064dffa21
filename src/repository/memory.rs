use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::domain::table::Table;
use crate::repository::{
    ProductListQuery, ProductReader, ProductWriter, RepositoryError, RepositoryResult,
};

/// Repository backed by the process-lifetime product table.
///
/// Created from the table loaded at startup and dropped at shutdown; changes
/// are never written back to the source file. Reads share a read lock and see
/// a stable snapshot, each mutation takes the write lock for its whole
/// duration. Cloning is cheap and shares the same table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryRepository {
    /// Create a new repository owning `table`.
    pub fn new(table: Table) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Table>> {
        self.table.read().map_err(|_| RepositoryError::LockPoisoned)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Table>> {
        self.table.write().map_err(|_| RepositoryError::LockPoisoned)
    }
}

impl From<Table> for InMemoryRepository {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl ProductReader for InMemoryRepository {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self.read()?.products().cloned().collect())
    }

    fn search_products(&self, query: &ProductListQuery) -> RepositoryResult<Vec<Product>> {
        Ok(query.apply(self.read()?.rows()))
    }

    fn get_product_by_id(&self, id: &str) -> RepositoryResult<Option<Product>> {
        Ok(self.read()?.get(id).cloned())
    }
}

impl ProductWriter for InMemoryRepository {
    fn create_product(&self, product: NewProduct) -> RepositoryResult<Product> {
        let mut table = self.write()?;
        let product_id = match product.product_id.clone() {
            Some(id) => id,
            None => table
                .next_ordinal_id()
                .ok_or(RepositoryError::OrdinalIdsExhausted)?,
        };
        match table.push(product.into_product(product_id)) {
            Ok(created) => Ok(created.clone()),
            Err(rejected) => Err(RepositoryError::DuplicateId(
                rejected.product_id.into_inner(),
            )),
        }
    }

    fn update_product(&self, id: &str, patch: ProductPatch) -> RepositoryResult<Product> {
        let mut table = self.write()?;
        table
            .update(id, patch)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn delete_product(&self, id: &str) -> RepositoryResult<Product> {
        let mut table = self.write()?;
        table
            .remove(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}
