//! Pure Rust codecs for seismic interchange formats.
//!
//! Zero `unsafe`, zero C dependencies. Reads and writes SAC binary
//! waveforms in either byte order, Silixa SEG-Y distributed acoustic
//! sensing volumes, and HypoInverse-2000 archive lines, with a shared
//! microsecond-resolution [`Time`] type tying them together.
//!
//! # Time arithmetic
//!
//! ```
//! use sff_rs::Time;
//!
//! let mut start = Time::new();
//! start.set_year(2020).unwrap();
//! start.set_month(1).unwrap();
//! start.set_day_of_month(9).unwrap();
//! start.set_minute(12).unwrap();
//! start.set_second(8).unwrap();
//!
//! // Adding seconds rolls the calendar fields.
//! let next = start + 86400.1;
//! assert_eq!(next.day_of_month(), 10);
//! assert_eq!(next.microsecond(), 100_000);
//! ```
//!
//! # Round-tripping a SAC waveform
//!
//! ```
//! use sff_rs::{ByteOrder, Waveform};
//!
//! let mut waveform = Waveform::new();
//! waveform.set_sampling_period(0.01).unwrap();
//! waveform.set_data(vec![0.5; 50]);
//!
//! let bytes = waveform.to_bytes(ByteOrder::Little).unwrap();
//! let decoded = Waveform::from_bytes(&bytes).unwrap();
//!
//! assert_eq!(decoded.number_of_samples(), 50);
//! assert_eq!(decoded.byte_order(), ByteOrder::Little);
//! ```
//!
//! # Parsing a HypoInverse-2000 pick
//!
//! ```
//! use sff_rs::StationArchiveLine;
//!
//! let line = "RBU  UU  EHZ IPU0202003181320 2596 -14198        0                   0     218110 0      84 85227    300     D 02";
//! let pick = StationArchiveLine::unpack(line).unwrap();
//!
//! assert_eq!(pick.station.as_deref(), Some("RBU"));
//! assert_eq!(pick.channel.as_deref(), Some("EHZ"));
//! assert_eq!(pick.pack(), line);
//! ```

pub mod error;
pub mod hypoinverse;
pub mod sac;
pub mod silixa;
pub mod time;

pub use error::{Result, SffError};
pub use hypoinverse::{AmplitudeUnits, EventSummaryLine, StationArchiveLine};
pub use sac::{ByteOrder, Character, Float, Header, Integer, Logical, Waveform};
pub use silixa::{BinaryFileHeader, Trace, TraceGroup, TraceHeader};
pub use time::Time;
