//! sv-core: shared foundation for the sous-vide controller.
//!
//! Contains:
//! - units (Celsius/Fahrenheit conversion + uom constructors)
//! - numeric (Real + tolerances + float checks)
//! - clock (monotonic timestamps and blocking waits, real or manual)
//! - shutdown (cancellation token shared with a host process)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod numeric;
pub mod shutdown;
pub mod units;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use shutdown::ShutdownToken;
pub use units::{celsius_to_fahrenheit, fahrenheit_to_celsius};
