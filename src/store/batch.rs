//! Mutation batches

use bytes::Bytes;

use super::ColumnFamily;

/// One write against a row
#[derive(Debug, Clone)]
pub enum Mutation {
    Put {
        family: ColumnFamily,
        row_key: Bytes,
        column: Bytes,
        value: Bytes,
    },
    Delete {
        family: ColumnFamily,
        row_key: Bytes,
        column: Bytes,
    },
    Increment {
        family: ColumnFamily,
        row_key: Bytes,
        column: Bytes,
        amount: i64,
    },
}

impl Mutation {
    pub fn family(&self) -> &ColumnFamily {
        match self {
            Mutation::Put { family, .. }
            | Mutation::Delete { family, .. }
            | Mutation::Increment { family, .. } => family,
        }
    }
}

/// Writes accumulated for one submission
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    mutations: Vec<Mutation>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, family: &ColumnFamily, row_key: Bytes, column: Bytes, value: Bytes) {
        self.mutations.push(Mutation::Put {
            family: family.clone(),
            row_key,
            column,
            value,
        });
    }

    pub fn delete(&mut self, family: &ColumnFamily, row_key: Bytes, column: Bytes) {
        self.mutations.push(Mutation::Delete {
            family: family.clone(),
            row_key,
            column,
        });
    }

    pub fn increment(&mut self, family: &ColumnFamily, row_key: Bytes, column: Bytes, amount: i64) {
        self.mutations.push(Mutation::Increment {
            family: family.clone(),
            row_key,
            column,
            amount,
        });
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mutation> {
        self.mutations.iter()
    }
}

impl IntoIterator for MutationBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}
