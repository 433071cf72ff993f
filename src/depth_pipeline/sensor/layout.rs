use super::types::RowOrder;

/// Maps each output row of an image to the row it was read out as.
///
/// Built once per decoder so reordering a frame needs no scratch copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMap {
    source_rows: Vec<usize>,
}

impl RowMap {
    pub fn new(order: RowOrder, height: usize) -> Self {
        let source_rows = match order {
            RowOrder::Sequential => (0..height).collect(),
            RowOrder::Interleaved => {
                let mut rows = Vec::with_capacity(height);
                rows.extend((0..height).step_by(2).rev());
                rows.extend((1..height).step_by(2));
                rows
            }
        };
        Self { source_rows }
    }

    #[inline]
    pub fn source_row(&self, row: usize) -> usize {
        self.source_rows[row]
    }

    pub fn len(&self) -> usize {
        self.source_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_rows.is_empty()
    }
}
