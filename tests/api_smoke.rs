//! Compile-time smoke test: verify top-level re-exports work.

use sff_rs::{
    AmplitudeUnits, BinaryFileHeader, ByteOrder, Character, EventSummaryLine, Float, Header,
    Integer, Logical, Result, SffError, StationArchiveLine, Time, Trace, TraceGroup, TraceHeader,
    Waveform,
};

#[test]
fn top_level_imports_compile() {
    // Just verify the types are usable from the crate root
    let _: fn(&[u8]) -> Result<Waveform> = Waveform::from_bytes;
    let _: fn(&[u8]) -> Result<TraceGroup> = TraceGroup::from_bytes;
    let _: fn(&str) -> Result<StationArchiveLine> = StationArchiveLine::unpack;
    let _: fn(&str) -> Result<EventSummaryLine> = EventSummaryLine::unpack;

    let _bo = ByteOrder::Big;
    let _t = Time::new();
    let _h = Header::new();
    let _f = Float::Delta;
    let _i = Integer::Npts;
    let _l = Logical::Leven;
    let _c = Character::Kstnm;

    let _bfh = BinaryFileHeader::new();
    let _th = TraceHeader::new();
    let _tr = Trace::new();

    let _au = AmplitudeUnits::PeakToPeak;

    // SffError is accessible
    let _e: Option<SffError> = None;
}
