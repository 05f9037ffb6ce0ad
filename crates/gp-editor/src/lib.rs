pub mod controller;
pub mod input;
pub mod interaction;
pub mod shortcuts;

pub use controller::{CanvasController, GraphMutation, Update};
pub use input::{InputEvent, PointerButton};
pub use interaction::{Action, InteractionMachine, InteractionState};
pub use shortcuts::{ShortcutAction, ShortcutMap};
