/// Dense boolean matrix over the (OR, AND) semiring.
///
/// Product entries are `true` iff at least one term of the ordinary product
/// would be non-zero, which is all reachability needs and avoids the
/// overflow of counting walks with floats or integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolMatrix {
    rows: usize,
    cols: usize,
    data: Vec<bool>,
}

impl BoolMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![false; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, true);
        }
        m
    }

    /// Adjacency matrix `A` with `A[target][source] = true` for each
    /// `(source, target)` edge
    pub fn adjacency(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut m = Self::zeros(n, n);
        for &(source, target) in edges {
            m.set(target, source, true);
        }
        m
    }

    /// Selector matrix `C` with one row per target and a single `true` in the
    /// target's column
    pub fn selector(n: usize, targets: &[usize]) -> Self {
        let mut m = Self::zeros(targets.len(), n);
        for (row, &target) in targets.iter().enumerate() {
            m.set(row, target, true);
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.data[row * self.cols + col] = value;
    }

    fn row(&self, row: usize) -> &[bool] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Boolean product `self · other`
    pub fn multiply(&self, other: &BoolMatrix) -> BoolMatrix {
        debug_assert_eq!(
            self.cols, other.rows,
            "cannot multiply {}x{} by {}x{}",
            self.rows, self.cols, other.rows, other.cols
        );
        let mut out = BoolMatrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            let out_row = &mut out.data[i * other.cols..(i + 1) * other.cols];
            for (k, &present) in self.row(i).iter().enumerate() {
                if !present {
                    continue;
                }
                for (o, &v) in out_row.iter_mut().zip(other.row(k)) {
                    *o |= v;
                }
            }
        }
        out
    }

    /// Columns holding `true` in the given row, ascending
    pub fn row_support(&self, row: usize) -> Vec<usize> {
        self.row(row)
            .iter()
            .enumerate()
            .filter_map(|(col, &v)| v.then_some(col))
            .collect()
    }

    /// `[A^0, A^1, ..., A^max_power]` with `A^0` the identity
    pub fn powers(&self, max_power: usize) -> Vec<BoolMatrix> {
        debug_assert_eq!(self.rows, self.cols, "powers need a square matrix");
        let mut powers = Vec::with_capacity(max_power + 1);
        powers.push(BoolMatrix::identity(self.rows));
        for k in 1..=max_power {
            let next = self.multiply(&powers[k - 1]);
            powers.push(next);
        }
        powers
    }
}
