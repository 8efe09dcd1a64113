pub mod renderer;

pub use renderer::{Flash, Renderer, View};
