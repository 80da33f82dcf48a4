// src/services/mod.rs
pub mod color_analyzer;
pub mod image_processor;
pub mod vision_provider;

pub use color_analyzer::ColorAnalyzer;
pub use image_processor::ImageProcessor;
pub use vision_provider::{OpenAiVisionProvider, VisionProvider};
