pub mod hit;
pub mod path;
pub mod scene;
pub mod theme;

pub use hit::{HitTarget, hit_test};
pub use scene::{
    EdgeVisual, Highlight, InteractionView, MenuItemView, MenuView, NodeVisual, PickerView,
    RelationOption, RubberBand, Scene, build_scene,
};
pub use theme::CanvasTheme;
