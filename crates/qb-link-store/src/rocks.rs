//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! All database calls are synchronous; the async trait methods delegate to
//! plain methods so no column family handle is held across an await point.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use qb_link_core::{Customer, CustomerId, CustomerUpdate};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // Serializes check-then-write sequences (display name uniqueness, merges).
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_customer(&self, id: &CustomerId) -> Result<Option<Customer>> {
        let cf = self.cf(cf::CUSTOMERS)?;

        self.db
            .get_cf(&cf, keys::customer_key(id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn get_customer_id_by_display_name(&self, display_name: &str) -> Result<Option<CustomerId>> {
        let cf = self.cf(cf::CUSTOMERS_BY_DISPLAY_NAME)?;

        self.db
            .get_cf(&cf, keys::display_name_key(display_name))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| keys::decode_customer_id(&data))
            .transpose()
    }

    fn get_customer_by_display_name(&self, display_name: &str) -> Result<Option<Customer>> {
        match self.get_customer_id_by_display_name(display_name)? {
            Some(id) => self.get_customer(&id),
            None => Ok(None),
        }
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        let cf = self.cf(cf::CUSTOMERS)?;

        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|item| {
                let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                Self::deserialize(&value)
            })
            .collect()
    }

    fn insert_customer(&self, display_name: &str, external_customer_id: &str) -> Result<Customer> {
        let _guard = self.lock()?;

        if self.get_customer_id_by_display_name(display_name)?.is_some() {
            return Err(StoreError::DuplicateDisplayName {
                display_name: display_name.to_string(),
            });
        }

        let customer = Customer::new(display_name, external_customer_id);

        let cf_customers = self.cf(cf::CUSTOMERS)?;
        let cf_by_name = self.cf(cf::CUSTOMERS_BY_DISPLAY_NAME)?;

        let customer_key = keys::customer_key(&customer.id);
        let name_key = keys::display_name_key(&customer.display_name);
        let value = Self::serialize(&customer)?;

        // Write record and index atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_customers, &customer_key, &value);
        batch.put_cf(&cf_by_name, &name_key, &customer_key);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(customer_id = %customer.id, display_name = %customer.display_name, "Customer stored");

        Ok(customer)
    }

    fn merge_customer(&self, id: &CustomerId, update: &CustomerUpdate) -> Result<Option<Customer>> {
        let _guard = self.lock()?;

        let Some(mut customer) = self.get_customer(id)? else {
            return Ok(None);
        };

        customer.apply(update);

        let cf = self.cf(cf::CUSTOMERS)?;
        let value = Self::serialize(&customer)?;
        self.db
            .put_cf(&cf, keys::customer_key(id), value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Some(customer))
    }
}

#[async_trait]
impl Store for RocksStore {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>> {
        self.get_customer(id)
    }

    async fn find_by_display_name(&self, display_name: &str) -> Result<Option<Customer>> {
        self.get_customer_by_display_name(display_name)
    }

    async fn find_all(&self) -> Result<Vec<Customer>> {
        self.list_customers()
    }

    async fn create(&self, display_name: &str, external_customer_id: &str) -> Result<Customer> {
        self.insert_customer(display_name, external_customer_id)
    }

    async fn update(&self, id: &CustomerId, update: &CustomerUpdate) -> Result<Option<Customer>> {
        self.merge_customer(id, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qb_link_core::InvoiceKind;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn create_and_find() {
        let (store, _dir) = create_test_store();

        let created = store.create("Jane Doe", "58").await.unwrap();

        let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);

        let by_name = store.find_by_display_name("Jane Doe").await.unwrap().unwrap();
        assert_eq!(by_name.external_customer_id, "58");
        assert_eq!(by_name.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_display_name_is_rejected() {
        let (store, _dir) = create_test_store();

        store.create("Jane Doe", "58").await.unwrap();
        let result = store.create("Jane Doe", "59").await;

        assert!(matches!(
            result,
            Err(StoreError::DuplicateDisplayName { ref display_name }) if display_name == "Jane Doe"
        ));

        // The original record is untouched
        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].external_customer_id, "58");
    }

    #[tokio::test]
    async fn missing_records_are_none() {
        let (store, _dir) = create_test_store();

        assert!(store.find_by_id(&CustomerId::generate()).await.unwrap().is_none());
        assert!(store.find_by_display_name("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let (store, _dir) = create_test_store();
        let created = store.create("Jane Doe", "58").await.unwrap();

        let updated = store
            .update(
                &created.id,
                &CustomerUpdate::invoice(InvoiceKind::SalaryAdvance, "145"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.salary_advance_invoice_id.as_deref(), Some("145"));

        store
            .update(&created.id, &CustomerUpdate::invoice(InvoiceKind::Tip, "146"))
            .await
            .unwrap();

        let stored = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.salary_advance_invoice_id.as_deref(), Some("145"));
        assert_eq!(stored.tip_invoice_id.as_deref(), Some("146"));
        assert_eq!(stored.display_name, created.display_name);
        assert_eq!(stored.external_customer_id, created.external_customer_id);
        assert_eq!(stored.created_at, created.created_at);
        assert!(stored.salary_advance_payment_id.is_none());
        assert!(stored.tip_payment_id.is_none());
    }

    #[tokio::test]
    async fn update_missing_record_is_none() {
        let (store, _dir) = create_test_store();

        let result = store
            .update(
                &CustomerId::generate(),
                &CustomerUpdate::invoice(InvoiceKind::Tip, "1"),
            )
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_returns_every_record() {
        let (store, _dir) = create_test_store();

        store.create("Jane Doe", "58").await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2)); // Ensure different ULIDs
        store.create("John Roe", "59").await.unwrap();

        let all = store.find_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "John Roe"]);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = RocksStore::open(dir.path()).unwrap();
            store.create("Jane Doe", "58").await.unwrap().id
        };

        let store = RocksStore::open(dir.path()).unwrap();
        let customer = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(customer.display_name, "Jane Doe");
        assert!(store.create("Jane Doe", "60").await.is_err());
    }
}
