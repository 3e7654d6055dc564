//! 引擎核心模块
//!
//! - **语言状态** (`language.rs`): 源语言、目标语言和当前语言
//! - **引擎** (`engine.rs`): 快照、翻译、恢复与缓存解析
//!
//! ```text
//! TextSwapEngine (engine.rs)
//!     ├── TextTree (pipeline/tree.rs)
//!     ├── TranslationLookup (lookup/mod.rs)
//!     ├── TranslationCache (storage/cache.rs)
//!     ├── KeyValueStore (storage/store.rs)
//!     └── LanguageState (language.rs)
//! ```

pub mod engine;
pub mod language;

pub use engine::{BatchReport, NodeFailure, TextSwapEngine};
pub use language::{normalize_lang, LanguageState};
