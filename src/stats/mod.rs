/// Numerical engines behind the linked views.
///
/// ```text
///   distributions   t / F CDFs, t quantile (incomplete beta)
///        │
///        ▼
///   regression      bivariate OLS + coefficient t-tests
///        │
///        ▼
///   subset          per-partition OLS, Chow test
///
///   loess           tricube local mean + confidence band
///   spatial         standardize, spatial lag, Moran scatter
/// ```
pub mod distributions;
pub mod loess;
pub mod regression;
pub mod spatial;
pub mod subset;

pub use loess::{loess, LoessConfig, LoessCurve};
pub use regression::{linear_regression, Coefficient, RegressionResult};
pub use spatial::{moran_scatter, spatial_lag, standardize};
pub use subset::{
    analyze_subsets, chow_test, partition, ChowTest, PartitionFit, RegressionBundle, SubsetAnalysis,
};
