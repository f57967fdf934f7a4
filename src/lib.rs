// Customer Hierarchy Viewer - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod category;   // Closed node classification + colour/field tables
pub mod config;     // Box geometry, spacing, framing, text caps
pub mod error;
pub mod labels;     // Pure header/detail text formatting
pub mod layout;     // Tidy tree layout
pub mod normalize;  // Customer record → DisplayNode tree
pub mod render;     // DisplayNode tree → positioned shapes
pub mod scenario;   // Scenario store
pub mod session;    // Loaded scenarios + selection + view state
pub mod svg;        // Diagram → SVG document
pub mod view;       // Pan/zoom transform and reset animation

// Re-export commonly used types
pub use category::{Bucket, Category, DetailField, Palette, Rgb};
pub use config::RenderConfig;
pub use error::{LoadError, RenderError, SelectionError};
pub use labels::{detail_lines, header_text, mask_account_number, truncate_chars, DetailLine};
pub use layout::{layout_tree, Bounds, LayoutNode};
pub use normalize::{normalize, DisplayNode};
pub use render::{render, Diagram, Shape};
pub use scenario::{ScenarioOption, ScenarioRecord, ScenarioStore};
pub use session::Session;
pub use svg::to_svg;
pub use view::{ViewTransform, ViewTransition};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where scenarios are read from unless told otherwise
pub const DEFAULT_SCENARIOS_PATH: &str = "data/scenarios.json";
