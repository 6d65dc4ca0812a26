//! Machine memory
//!
//! A flat store of signed integers indexed from zero. Growable memory
//! zero-extends on every access, reads included, so probing an address leaves
//! the store at least that long afterwards. Growth past the memory's limit,
//! or past what the allocator will hand out, is a fault rather than a panic.

use std::fmt;

use crate::vm::errors::VMError;

/// Whether a memory may grow past its initial image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPolicy {
    /// Zero-extend on any access past the end
    Growable,
    /// Never grow; out-of-range access is a fault
    Fixed,
}

/// Provides addressable storage for a single machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VMMemory {
    cells: Vec<i64>,
    policy: MemoryPolicy,
    limit: usize,
}

impl VMMemory {
    /// Create a growable memory from an initial image
    pub fn new(image: Vec<i64>) -> Self {
        Self::with_policy(image, MemoryPolicy::Growable)
    }

    /// Create a memory with an explicit growth policy
    pub fn with_policy(image: Vec<i64>, policy: MemoryPolicy) -> Self {
        Self {
            cells: image,
            policy,
            limit: usize::MAX,
        }
    }

    /// Cap growable memory at `limit` cells
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Make `address` a valid index, zero-filling any new cells
    fn ensure(&mut self, address: usize) -> Result<(), VMError> {
        if address < self.cells.len() {
            return Ok(());
        }

        match self.policy {
            MemoryPolicy::Growable => {
                if address >= self.limit {
                    return Err(VMError::MemoryExhausted { address });
                }
                self.cells
                    .try_reserve(address + 1 - self.cells.len())
                    .map_err(|_| VMError::MemoryExhausted { address })?;
                self.cells.resize(address + 1, 0);
                Ok(())
            }
            MemoryPolicy::Fixed => Err(VMError::AddressOutOfRange {
                address,
                len: self.cells.len(),
            }),
        }
    }

    /// Read the value at `address`
    pub fn read(&mut self, address: usize) -> Result<i64, VMError> {
        self.ensure(address)?;
        Ok(self.cells[address])
    }

    /// Write `value` at `address`
    pub fn write(&mut self, address: usize, value: i64) -> Result<(), VMError> {
        self.ensure(address)?;
        self.cells[address] = value;
        Ok(())
    }

    pub fn policy(&self) -> MemoryPolicy {
        self.policy
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    /// Consume the memory and return its cells
    pub fn into_inner(self) -> Vec<i64> {
        self.cells
    }
}

impl fmt::Display for VMMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.cells.iter().map(|v| v.to_string()).collect();
        write!(f, "Memory: [{}]", items.join(","))
    }
}
