//! Single-lesson learning flow: watch a video segment, answer a quiz, collect
//! a reward, return to the lesson map.

pub mod config;
pub mod content;
pub mod quiz;
pub mod runtime;
pub mod screen;
