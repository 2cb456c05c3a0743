/// Z-scores using the sample mean and the sample (n - 1) standard deviation.
///
/// Inputs with fewer than two values or zero spread map to all zeros.
pub fn standardize(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mean = data.iter().sum::<f64>() / n as f64;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sd = variance.sqrt();
    if !(sd > 0.0) || !sd.is_finite() {
        log::debug!("standardize: zero or non-finite spread (sd={sd})");
        return vec![0.0; n];
    }
    data.iter().map(|v| (v - mean) / sd).collect()
}

/// Neighbor-averaged value per row.
///
/// `neighbors[i]` lists the rows adjacent to row `i`. Rows without neighbors
/// (islands) get 0; neighbor indices outside `values` are skipped.
pub fn spatial_lag(values: &[f64], neighbors: &[Vec<usize>]) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let Some(nbrs) = neighbors.get(i) else {
                return 0.0;
            };
            let (sum, count) = nbrs
                .iter()
                .filter_map(|&j| values.get(j))
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            if count == 0 {
                0.0
            } else {
                sum / count as f64
            }
        })
        .collect()
}

/// Moran scatter coordinates: standardized values against their spatial lag.
///
/// With row-standardized weights the OLS slope of the lag on the z-scores is
/// Moran's I.
pub fn moran_scatter(values: &[f64], neighbors: &[Vec<usize>]) -> (Vec<f64>, Vec<f64>) {
    let z = standardize(values);
    let lag = spatial_lag(&z, neighbors);
    (z, lag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn standardize_uses_sample_sd() {
        let z = standardize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // mean 5, sample variance 32/7
        let sd = (32.0f64 / 7.0).sqrt();
        assert_abs_diff_eq!(z[0], -3.0 / sd, epsilon = 1e-12);
        assert_abs_diff_eq!(z.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn standardize_constant_is_zero() {
        assert_eq!(standardize(&[4.0, 4.0, 4.0]), vec![0.0; 3]);
        assert_eq!(standardize(&[4.0]), vec![0.0]);
    }

    #[test]
    fn lag_averages_neighbors_and_handles_islands() {
        let values = [1.0, 2.0, 3.0, 10.0];
        let neighbors = vec![vec![1, 2], vec![0], vec![], vec![0, 42]];
        let lag = spatial_lag(&values, &neighbors);
        assert_eq!(lag, vec![2.5, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn moran_scatter_has_matching_lengths() {
        let (z, lag) = moran_scatter(&[1.0, 2.0, 3.0], &[vec![1], vec![0, 2], vec![1]]);
        assert_eq!(z.len(), 3);
        assert_eq!(lag.len(), 3);
        assert_abs_diff_eq!(lag[1], 0.0, epsilon = 1e-12);
    }
}
