/// Data layer: the numeric table the linked views share.
///
/// Architecture:
/// ```text
///   synth (demo) / host columns
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  DatasetId, named f64 columns, neighbor lists
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  brush rectangle → row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod model;
pub mod synth;
