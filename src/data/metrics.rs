use super::model::CovidRecord;

// ---------------------------------------------------------------------------
// Derived columns
// ---------------------------------------------------------------------------

/// One row of the filtered view with its derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub record: CovidRecord,
    /// Confirmed − Recovered − Deaths.
    pub active: i64,
    /// First difference of Confirmed, 0 on the first row.
    pub daily_confirmed: f64,
    /// Fractional change of Confirmed, 0 on the first row.
    /// `None` when growing from a zero base.
    pub growth_rate: Option<f64>,
    /// Trailing mean over `window` rows, `None` until the window fills.
    pub ma_confirmed: Option<f64>,
}

/// Compute the derived columns over rows already in date order.
///
/// Windows restart at the first row of the view, so the moving average is
/// undefined for its first `window - 1` rows.
pub fn derive(rows: &[CovidRecord], window: usize) -> Vec<DerivedRow> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(rows.len());
    let mut running_sum = 0.0;

    for (i, rec) in rows.iter().enumerate() {
        let confirmed = rec.confirmed as f64;
        let prev = i.checked_sub(1).map(|p| rows[p].confirmed as f64);

        let daily_confirmed = prev.map_or(0.0, |p| confirmed - p);
        let growth_rate = match prev {
            None => Some(0.0),
            Some(p) if p == 0.0 && confirmed == 0.0 => Some(0.0),
            Some(p) if p == 0.0 => None,
            Some(p) => Some((confirmed - p) / p),
        };

        running_sum += confirmed;
        if i >= window {
            running_sum -= rows[i - window].confirmed as f64;
        }
        let ma_confirmed = (i + 1 >= window).then(|| running_sum / window as f64);

        out.push(DerivedRow {
            record: rec.clone(),
            active: rec.active(),
            daily_confirmed,
            growth_rate,
            ma_confirmed,
        });
    }
    out
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Columns entering the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 4] = ["Confirmed", "Deaths", "Recovered", "Active"];

/// Pearson correlations; `None` where a column is constant or the view has
/// fewer than two rows.
pub type CorrelationMatrix = [[Option<f64>; 4]; 4];

pub fn correlation_matrix(rows: &[DerivedRow]) -> CorrelationMatrix {
    let columns: [Vec<f64>; 4] = [
        rows.iter().map(|r| r.record.confirmed as f64).collect(),
        rows.iter().map(|r| r.record.deaths as f64).collect(),
        rows.iter().map(|r| r.record.recovered as f64).collect(),
        rows.iter().map(|r| r.active as f64).collect(),
    ];

    let mut matrix = [[None; 4]; 4];
    for i in 0..4 {
        for j in i..4 {
            let r = pearson(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

/// Sample Pearson correlation coefficient of two equally long series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width histogram bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Left edge of the first bin.
    pub start: f64,
    /// Width of every bin (1.0 for a degenerate single-value histogram).
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Centre of bin `i` on the value axis.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin `values` into at most `bins` equal-width buckets spanning min..=max.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Histogram {
            start: 0.0,
            bin_width: 1.0,
            counts: Vec::new(),
        };
    };

    if max == min || bins <= 1 {
        let width = if max == min { 1.0 } else { max - min };
        return Histogram {
            start: if max == min { min - 0.5 } else { min },
            bin_width: width,
            counts: vec![finite.len()],
        };
    }

    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / bin_width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram {
        start: min,
        bin_width,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::rec;

    fn series(confirmed: &[i64]) -> Vec<CovidRecord> {
        confirmed
            .iter()
            .enumerate()
            .map(|(i, &c)| rec("Italy", &format!("2020-03-{:02}", i + 1), c, 0, 0))
            .collect()
    }

    #[test]
    fn first_difference_and_percent_change() {
        let rows = derive(&series(&[10, 15, 15, 30]), 7);
        let daily: Vec<f64> = rows.iter().map(|r| r.daily_confirmed).collect();
        assert_eq!(daily, vec![0.0, 5.0, 0.0, 15.0]);

        let growth: Vec<Option<f64>> = rows.iter().map(|r| r.growth_rate).collect();
        assert_eq!(growth, vec![Some(0.0), Some(0.5), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn growth_from_zero_base() {
        let rows = derive(&series(&[0, 0, 3, 6]), 7);
        assert_eq!(rows[1].growth_rate, Some(0.0));
        assert_eq!(rows[2].growth_rate, None);
        assert_eq!(rows[3].growth_rate, Some(1.0));
    }

    #[test]
    fn seven_row_trailing_mean() {
        let rows = derive(&series(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), 7);
        assert!(rows[..6].iter().all(|r| r.ma_confirmed.is_none()));
        assert_eq!(rows[6].ma_confirmed, Some(4.0));
        assert_eq!(rows[7].ma_confirmed, Some(5.0));
        assert_eq!(rows[8].ma_confirmed, Some(6.0));

        let short = derive(&series(&[1, 2, 3]), 7);
        assert!(short.iter().all(|r| r.ma_confirmed.is_none()));
    }

    #[test]
    fn derived_active_matches_identity() {
        let rows = derive(
            &[
                rec("Peru", "2020-05-01", 100, 3, 40),
                rec("Peru", "2020-05-02", 130, 4, 55),
            ],
            7,
        );
        for r in &rows {
            assert_eq!(r.active + r.record.recovered + r.record.deaths, r.record.confirmed);
        }
    }

    #[test]
    fn empty_view_derives_nothing() {
        assert!(derive(&[], 7).is_empty());
        assert_eq!(correlation_matrix(&[]), [[None; 4]; 4]);
    }

    #[test]
    fn pearson_extremes() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[5.0; 4]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let rows = derive(
            &[
                rec("Peru", "2020-05-01", 100, 3, 40),
                rec("Peru", "2020-05-02", 130, 4, 55),
                rec("Peru", "2020-05-03", 180, 6, 60),
                rec("Peru", "2020-05-04", 200, 9, 90),
            ],
            7,
        );
        let m = correlation_matrix(&rows);
        for i in 0..4 {
            assert!((m[i][i].unwrap() - 1.0).abs() < 1e-12);
            for j in 0..4 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
    }

    #[test]
    fn constant_column_has_no_correlation() {
        // Recovered stays at zero, as in the source after reporting stopped.
        let rows = derive(&series(&[1, 4, 9]), 7);
        let m = correlation_matrix(&rows);
        assert_eq!(m[2][0], None);
        assert_eq!(m[2][2], None);
        assert!(m[0][3].is_some());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let h = histogram(&values, 50);
        assert_eq!(h.counts.len(), 50);
        assert_eq!(h.total(), 100);
        // Max lands in the last bin rather than one past it.
        assert_eq!(h.counts[49], 2);
        assert!((h.bin_center(0) - (99.0 / 100.0)).abs() < 1e-9);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        let h = histogram(&[7.0, 7.0, 7.0], 50);
        assert_eq!(h.counts, vec![3]);
        assert_eq!(h.bin_center(0), 7.0);

        assert!(histogram(&[], 50).counts.is_empty());
        assert_eq!(histogram(&[f64::NAN, 1.0, 2.0], 2).total(), 2);
    }
}
