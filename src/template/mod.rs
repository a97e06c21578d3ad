pub mod renderer;

pub use renderer::DocumentRenderer;
