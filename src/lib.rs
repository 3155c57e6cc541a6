//! # doc-finder
//!
//! Finds Java classes in a local Maven repository and the installed JDK, and
//! renders their javadoc as Markdown or shows their source in the terminal.
//!
//! ## Architecture
//!
//! - **coords**: Maven coordinates from repository paths, archive discovery
//! - **extract**: javadoc/sources archive extraction into the output root
//! - **links**: class links in javadoc HTML
//! - **javadoc**: class records from extracted javadoc class index pages
//! - **jdk**: Java version detection and JDK class records from the API docs
//! - **record**: class records and canonical keys
//! - **index**: persistent class index using LMDB (heed)
//! - **indexer**: the discover, extract, harvest, store pipeline
//! - **markdown**: javadoc class page to Markdown
//! - **view**: class lookup and rendering, with a cache for fetched JDK pages
//! - **select**: fzf selection and pager loop

pub mod cli;
pub mod config;
pub mod coords;
pub mod error;
pub mod extract;
pub mod index;
pub mod indexer;
pub mod javadoc;
pub mod jdk;
pub mod links;
pub mod markdown;
pub mod record;
pub mod select;
pub mod view;
