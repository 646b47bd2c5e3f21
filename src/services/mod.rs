pub mod emotion;
pub mod genai;
