pub mod ollama;

pub use ollama::{assemble_response, Assembled, OllamaClient, ProbeReport};
