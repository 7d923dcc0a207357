//! Record navigator for paired-section comparison files.
//!
//! A comparison file is a JSON array of records, each pairing two text
//! sections with their rules and a note on how the two relate. This crate
//! loads such a file into a [`Navigator`], steps through the records and
//! derives everything a presentation layer needs to draw the current one.
//!
//! # Quick Start
//!
//! ```
//! use pairview_navigator::{Direction, Navigator};
//!
//! let mut nav = Navigator::default();
//! nav.load(r#"[{"section_1_id": "A", "section_2_id": "B"}, {}]"#)?;
//!
//! assert_eq!(nav.active_index(), Some(0));
//! nav.step(Direction::Next);
//! assert_eq!(nav.counter_text(), "(2 از 2)");
//! # Ok::<(), pairview_navigator::NavigatorError>(())
//! ```
//!
//! The navigator holds no global state; every page session (or test)
//! builds its own.

pub mod error;
pub mod labels;
pub mod navigator;
pub mod notify;
pub mod record;
pub mod render;

pub use error::{NavResult, NavigatorError, ParseError};
pub use labels::Labels;
pub use navigator::{Direction, Navigator, NavigatorEvent, Position};
pub use notify::{Notification, NotificationTiming, Severity};
pub use record::{Record, RecordSet};
pub use render::{format_text, selector_label, RecordView, RenderedSection};
