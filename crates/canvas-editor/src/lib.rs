pub mod connection;
pub mod context_menu;
pub mod drag;
pub mod input;
pub mod mutation;
pub mod selection;
pub mod session;
pub mod shortcuts;

pub use connection::{ConnectionController, ConnectionDraft, ConnectionState};
pub use context_menu::{ContextMenuController, MenuAction, MenuTarget};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use mutation::GraphMutation;
pub use selection::Selection;
pub use session::{Effect, GraphEditorSession};
