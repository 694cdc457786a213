//! KAMELS setup tool library.
//!
//! Walks the user through the settings the switcher needs, asking only for
//! what is still unset, and saves after every answered step so an aborted
//! session keeps its progress.
//!
//! - [`prompt`] – bounded numeric prompts behind the [`prompt::Prompter`] trait.
//! - [`table`] – the device table shown when picking a peripheral.
//! - [`wizard`] – the step sequence itself.

pub mod prompt;
pub mod table;
pub mod wizard;
