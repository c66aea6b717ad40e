use super::{DBColumn, Error, Store};
use parking_lot::RwLock;
use std::collections::HashMap;

type DBHashMap = HashMap<Vec<u8>, Vec<u8>>;

/// A thread-safe `HashMap` wrapper.
///
/// Writes are visible to subsequent reads in the same process; nothing stronger is promised.
pub struct MemoryStore {
    db: RwLock<DBHashMap>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::open()
    }
}

impl MemoryStore {
    /// Create a new, empty database.
    pub fn open() -> Self {
        Self {
            db: RwLock::new(HashMap::new()),
        }
    }

    fn get_key_for_col(col: DBColumn, key: &[u8]) -> Vec<u8> {
        let mut col_key = col.as_bytes().to_vec();
        col_key.extend_from_slice(key);
        col_key
    }
}

impl Store for MemoryStore {
    /// Get the value of some key from the database. Returns `None` if the key does not exist.
    fn get_bytes(&self, col: DBColumn, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        let column_key = Self::get_key_for_col(col, key);

        Ok(self.db.read().get(&column_key).cloned())
    }

    /// Puts a key in the database.
    fn put_bytes(&self, col: DBColumn, key: &[u8], val: &[u8]) -> Result<(), Error> {
        let column_key = Self::get_key_for_col(col, key);

        self.db.write().insert(column_key, val.to_vec());

        Ok(())
    }

    /// Return true if some key exists in some column.
    fn key_exists(&self, col: DBColumn, key: &[u8]) -> Result<bool, Error> {
        let column_key = Self::get_key_for_col(col, key);

        Ok(self.db.read().contains_key(&column_key))
    }

    /// Delete some key from the database.
    fn key_delete(&self, col: DBColumn, key: &[u8]) -> Result<(), Error> {
        let column_key = Self::get_key_for_col(col, key);

        self.db.write().remove(&column_key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let store = MemoryStore::open();

        store
            .put_bytes(DBColumn::BeaconBlock, &[1, 2, 3], &[4, 5, 6])
            .unwrap();

        assert_eq!(
            store.get_bytes(DBColumn::BeaconBlock, &[1, 2, 3]).unwrap(),
            Some(vec![4, 5, 6])
        );
        assert!(store.key_exists(DBColumn::BeaconBlock, &[1, 2, 3]).unwrap());

        // Columns are distinct keyspaces.
        assert_eq!(store.get_bytes(DBColumn::BlockIndex, &[1, 2, 3]).unwrap(), None);

        store.key_delete(DBColumn::BeaconBlock, &[1, 2, 3]).unwrap();
        assert!(!store.key_exists(DBColumn::BeaconBlock, &[1, 2, 3]).unwrap());
    }
}
