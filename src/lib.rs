//! Purpose: INI configuration reader with evaluated values, list options and section categories.
//! Exports: `api` (parser, values, errors); `core` holds the implementation modules.
//! Role: Library backing the `cfgparser` CLI; `api` is the supported import path.
//! Invariants: Read-only: nothing here writes configuration back out.
//! Invariants: Core modules never perform I/O except the explicit `read_path*` loaders.
pub mod api;
pub mod core;
