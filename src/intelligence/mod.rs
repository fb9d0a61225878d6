// ABOUTME: Outreach intelligence: prompt building, output parsing, and templating
// ABOUTME: Turns aggregated research into validated, personalized report content
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Intelligence Module
//!
//! The generation step is the one unstructured stage of the pipeline. The
//! synthesizer asks the model for a JSON object, and the parser accepts it only
//! when every field is present, so nothing downstream sees a partial report.

/// Structured parsing of model output
pub mod parser;
/// System and user prompt construction
pub mod prompts;
/// LLM-backed report synthesis
pub mod synthesizer;
/// Personalization placeholder substitution
pub mod templater;

pub use parser::{parse_generation, GenerationParse};
pub use synthesizer::{ReportSynthesizer, SynthesisInput, SynthesizedReport};
pub use templater::{apply_placeholders, Personalization, Templater};
