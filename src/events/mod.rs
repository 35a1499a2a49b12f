//! # Events Module
//!
//! Progress reporting for a dedup run.
//!
//! The pipeline emits events through a channel so any front end (CLI
//! progress bar, HTTP handler, log sink) can subscribe without the core
//! knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Hash(HashEvent::Progress(p)) = event {
//!             println!("Hashed {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(request, &sender, &CancellationToken::new())?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
