pub mod assistant;
pub mod fallback;
pub mod gemini;
pub mod history;
