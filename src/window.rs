use crate::types::{ContingencyTable, Margins};

/// Values of the allelic statistic `2a + b` that are strictly less extreme
/// than the observed table, `alpha ..= beta`.
///
/// `a` and `b` are the case-row `aa` and `aA` counts of a candidate table
/// with the observed margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceWindow {
    pub alpha: i64,
    pub beta: i64,
}

/// Inclusive `a` range of one rectangular piece of the acceptance region.
/// Empty when `start > end`.
pub type ARange = (i64, i64);

// Divisor is always positive here.
fn floor_div(a: i128, b: i128) -> i128 {
    a.div_euclid(b)
}

fn ceil_div(a: i128, b: i128) -> i128 {
    -(-a).div_euclid(b)
}

impl AcceptanceWindow {
    /// Window for the observed table, or `None` when no table with these
    /// margins is less extreme (empty table, or `alpha > beta`).
    pub fn for_table(table: &ContingencyTable) -> Option<Self> {
        let m = table.margins();
        if m.n == 0 {
            return None;
        }
        let total = m.total_alleles() as i128;
        let expected = m.expected_cross_product();
        let observed = (total * table.case_allele_count() as i128 - expected).abs();

        let alpha = floor_div(expected - observed, total) + 1;
        let beta = ceil_div(expected + observed, total) - 1;
        if alpha > beta {
            return None;
        }
        Some(Self {
            alpha: alpha as i64,
            beta: beta as i64,
        })
    }

    pub fn contains(&self, statistic: i64) -> bool {
        self.alpha <= statistic && statistic <= self.beta
    }

    /// Split the acceptance region into four `a` ranges.
    ///
    /// For fixed `a`, `b` is capped above by `c2` while `a <= l1 - c2` and by
    /// `l1 - a` after, and below by `l1 - c3 - a` while `a <= l1 - c3` and by
    /// `0` after. Each range covers one combination of binding caps, trimmed so
    /// that the band `alpha <= 2a + b <= beta` meets the `b` column:
    ///
    /// | range | upper cap | lower cap     |
    /// |-------|-----------|---------------|
    /// | 0     | `c2`      | `l1 - c3 - a` |
    /// | 1     | `c2`      | `0`           |
    /// | 2     | `l1 - a`  | `l1 - c3 - a` |
    /// | 3     | `l1 - a`  | `0`           |
    ///
    /// The ranges are disjoint and still need intersecting with
    /// [`Margins::a_bounds`].
    pub fn a_ranges(&self, m: &Margins) -> [ARange; 4] {
        let (alpha, beta) = (self.alpha as i128, self.beta as i128);
        let (c2, c3, l1) = (m.c2 as i128, m.c3 as i128, m.l1 as i128);

        let ceil_alpha_c2 = ceil_div(alpha - c2, 2);
        let beta_c3_l1 = beta + c3 - l1;
        let floor_beta = floor_div(beta, 2);

        let ranges = [
            (ceil_alpha_c2, (l1 - c2).min(l1 - c3).min(beta_c3_l1)),
            (ceil_alpha_c2.max(l1 - c3 + 1), (l1 - c2).min(floor_beta)),
            ((l1 - c2 + 1).max(alpha - l1), (l1 - c3).min(beta_c3_l1)),
            ((alpha - l1).max(l1 - c2 + 1).max(l1 - c3 + 1), floor_beta),
        ];
        ranges.map(|(start, end)| (start as i64, end as i64))
    }

    /// `b` range for a fixed `a`: margin feasibility intersected with the band.
    pub fn b_range(&self, m: &Margins, a: i64) -> (i64, i64) {
        let (b_min, b_max) = m.b_bounds(a);
        ((self.alpha - 2 * a).max(b_min), (self.beta - 2 * a).min(b_max))
    }

    /// Every `(a, b)` of the acceptance region, range by range.
    pub fn lattice_points(&self, m: &Margins) -> impl Iterator<Item = (i64, i64)> + '_ {
        let (a_min, a_max) = m.a_bounds();
        let m = *m;
        self.a_ranges(&m)
            .into_iter()
            .flat_map(move |(start, end)| start.max(a_min)..=end.min(a_max))
            .flat_map(move |a| {
                let (b_start, b_end) = self.b_range(&m, a);
                (b_start..=b_end).map(move |b| (a, b))
            })
    }
}
