//! Project idea pool for the daily project block, keyed by role.

use crate::catalog::RoleId;

const EMBEDDED: &[&str] = &[
    "Build a UART driver with interrupt-driven RX buffering",
    "Port a FreeRTOS task set to a new MCU board",
    "Write an I2C sensor driver and log readings over serial",
    "Implement a bootloader with firmware update over serial",
    "Profile and reduce ISR latency in an existing project",
];

const SWE: &[&str] = &[
    "Build a rate limiter library with token bucket and sliding window",
    "Add caching to a REST API and measure latency improvement",
    "Design a job queue with retry and dead-letter handling",
    "Refactor a module to dependency injection and add tests",
    "Implement pagination and filtering for a list endpoint",
];

const ML_DL: &[&str] = &[
    "Train a small CNN on CIFAR-10 and plot learning curves",
    "Implement backpropagation by hand for a two-layer net",
    "Fine-tune a pretrained model on a custom dataset",
    "Build a feature pipeline with train/validation leakage checks",
    "Compare optimizers on the same architecture and dataset",
];

const GENAI: &[&str] = &[
    "Build a RAG pipeline over your own notes with citations",
    "Write an evaluation harness for prompt variants",
    "Implement function calling with schema validation",
    "Build a token-streaming chat interface with history",
    "Compare embedding models on a retrieval benchmark",
];

const CODING: &[&str] = &[
    "Solve five graph problems and write up the patterns",
    "Implement an LRU cache from scratch with tests",
    "Practice two dynamic programming problems under time pressure",
    "Implement a trie and use it for prefix search",
    "Re-solve a failed problem from memory, then compare",
];

/// Idea pool for one role. Never empty.
pub(crate) fn ideas_for(role: RoleId) -> &'static [&'static str] {
    match role {
        RoleId::Embedded => EMBEDDED,
        RoleId::Swe => SWE,
        RoleId::MlDl => ML_DL,
        RoleId::GenAi => GENAI,
        RoleId::Coding => CODING,
    }
}
