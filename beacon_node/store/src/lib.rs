//! Storage functionality for the beacon chain.
//!
//! The bottom layer is an opaque byte→byte map (`Store`) with the durability contract "writes
//! are visible to subsequent reads in the same process". On top of it, `ChainStore` maintains
//! the three logical keyspaces of the chain: blocks by root, block roots by slot, and the best
//! justified checkpoint.

mod chain_store;
mod memory_store;

pub use chain_store::ChainStore;
pub use memory_store::MemoryStore;

use ssz::DecodeError;
use types::{BeaconBlock, Checkpoint, EthSpec, Hash256};

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// Stored bytes could not be decoded: the store is corrupt.
    SszDecodeError(DecodeError),
    /// The backing map failed.
    DBError { message: String },
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Error {
        Error::SszDecodeError(e)
    }
}

/// The logical keyspaces overlaid on the flat byte map.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DBColumn {
    BeaconBlock,
    BlockIndex,
    Checkpoint,
}

impl DBColumn {
    /// The byte prefix a column's keys carry in the flat map.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            DBColumn::BeaconBlock => b"block",
            DBColumn::BlockIndex => b"block-index",
            DBColumn::Checkpoint => b"checkpoint",
        }
    }
}

/// An object capable of storing and retrieving objects implementing `StoreItem`.
///
/// A `Store` is fundamentally backed by a key-value database, however it provides support for
/// columns. A simple column implementation might involve prefixing a key with some bytes unique
/// to each column.
pub trait Store: Sync + Send + Sized {
    /// Retrieve some bytes in `column` with `key`.
    fn get_bytes(&self, column: DBColumn, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;

    /// Store some `value` in `column`, indexed with `key`.
    fn put_bytes(&self, column: DBColumn, key: &[u8], value: &[u8]) -> Result<(), Error>;

    /// Return `true` if `key` exists in `column`.
    fn key_exists(&self, column: DBColumn, key: &[u8]) -> Result<bool, Error>;

    /// Removes `key` from `column`.
    fn key_delete(&self, column: DBColumn, key: &[u8]) -> Result<(), Error>;

    /// Store an item in `Self`.
    fn put<I: StoreItem>(&self, key: &[u8], item: &I) -> Result<(), Error> {
        self.put_bytes(I::db_column(), key, &item.as_store_bytes())
    }

    /// Retrieve an item from `Self`.
    fn get<I: StoreItem>(&self, key: &[u8]) -> Result<Option<I>, Error> {
        match self.get_bytes(I::db_column(), key)? {
            Some(bytes) => Ok(Some(I::from_store_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// An item that may be stored in a `Store`.
pub trait StoreItem: Sized {
    /// Identifies which column this item should be placed in.
    fn db_column() -> DBColumn;

    /// Serialize `self` as bytes.
    fn as_store_bytes(&self) -> Vec<u8>;

    /// De-serialize `self` from bytes.
    fn from_store_bytes(bytes: &[u8]) -> Result<Self, Error>;
}

impl<E: EthSpec> StoreItem for BeaconBlock<E> {
    fn db_column() -> DBColumn {
        DBColumn::BeaconBlock
    }

    fn as_store_bytes(&self) -> Vec<u8> {
        ssz::ssz_encode(self)
    }

    fn from_store_bytes(bytes: &[u8]) -> Result<Self, Error> {
        ssz::Decode::from_ssz_bytes(bytes).map_err(Into::into)
    }
}

impl StoreItem for Checkpoint {
    fn db_column() -> DBColumn {
        DBColumn::Checkpoint
    }

    fn as_store_bytes(&self) -> Vec<u8> {
        ssz::ssz_encode(self)
    }

    fn from_store_bytes(bytes: &[u8]) -> Result<Self, Error> {
        ssz::Decode::from_ssz_bytes(bytes).map_err(Into::into)
    }
}

/// The list of block roots observed at a single slot, stored in the `block-index` column.
#[derive(Debug, PartialEq, Clone, Default, ssz_derive::Encode, ssz_derive::Decode)]
pub struct BlockRootsAtSlot {
    pub roots: Vec<Hash256>,
}

impl StoreItem for BlockRootsAtSlot {
    fn db_column() -> DBColumn {
        DBColumn::BlockIndex
    }

    fn as_store_bytes(&self) -> Vec<u8> {
        ssz::ssz_encode(self)
    }

    fn from_store_bytes(bytes: &[u8]) -> Result<Self, Error> {
        ssz::Decode::from_ssz_bytes(bytes).map_err(Into::into)
    }
}
