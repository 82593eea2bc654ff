pub mod render;

pub use render::SnapshotRenderer;
