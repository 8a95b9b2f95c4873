//! Standard MIDI File (format 1) serialization

use thiserror::Error;

use crate::composition::Composition;
use crate::instrument::{Instrument, VOICE_COUNT};
use crate::resolver;

/// Header division: ticks per quarter note. Fixed; the composition's
/// BPM is not written to the file, so consumers see 120 BPM timing
/// unless they carry the tempo out-of-band.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Tick span of one 4/4 measure.
pub const TICKS_PER_MEASURE: u32 = 4 * TICKS_PER_QUARTER as u32;

/// Status and meta bytes used by the writer.
mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const META: u8 = 0xFF;
    pub const META_TRACK_NAME: u8 = 0x03;
    pub const META_END_OF_TRACK: u8 = 0x2F;
}

/// Export is the only operation here that may fail visibly; everything
/// upstream of it recovers locally.
#[derive(Debug, Error)]
pub enum MidiExportError {
    #[error("track name {0:?} is not ASCII")]
    NonAsciiName(String),
    #[error("meta payload of {0} bytes exceeds the single-byte length field")]
    MetaTooLong(usize),
}

/// Serialize a composition as a format-1 SMF: one track per voice in
/// slot order, division 480.
pub fn export_midi(composition: &Composition) -> Result<Vec<u8>, MidiExportError> {
    let mut data = Vec::new();

    data.extend_from_slice(b"MThd");
    data.extend_from_slice(&6u32.to_be_bytes());
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&(VOICE_COUNT as u16).to_be_bytes());
    data.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

    for voice in Instrument::ALL {
        let track = encode_track(composition, voice)?;
        data.extend_from_slice(b"MTrk");
        data.extend_from_slice(&(track.len() as u32).to_be_bytes());
        data.extend_from_slice(&track);
    }

    Ok(data)
}

fn encode_track(composition: &Composition, voice: Instrument) -> Result<Vec<u8>, MidiExportError> {
    let channel = voice.index() as u8;
    let mut track = Vec::new();

    write_delta(&mut track, 0);
    write_track_name(&mut track, voice.display_name())?;

    write_delta(&mut track, 0);
    track.push(status::PROGRAM_CHANGE | channel);
    track.push(voice.gm_program());

    // One whole-measure note per resolvable measure. The note-on delta
    // is the absolute start tick and the note-off delta the fixed
    // measure span; this matches the legacy export layout byte for byte.
    for event in resolver::resolve_voice(composition, voice) {
        write_delta(&mut track, event.measure as u32 * TICKS_PER_MEASURE);
        track.push(status::NOTE_ON | channel);
        track.push(event.note);
        track.push(event.velocity);

        write_delta(&mut track, TICKS_PER_MEASURE);
        track.push(status::NOTE_OFF | channel);
        track.push(event.note);
        track.push(0);
    }

    write_delta(&mut track, 0);
    track.push(status::META);
    track.push(status::META_END_OF_TRACK);
    track.push(0);

    Ok(track)
}

fn write_track_name(track: &mut Vec<u8>, name: &str) -> Result<(), MidiExportError> {
    if !name.is_ascii() {
        return Err(MidiExportError::NonAsciiName(name.to_string()));
    }
    if name.len() > u8::MAX as usize {
        return Err(MidiExportError::MetaTooLong(name.len()));
    }
    track.push(status::META);
    track.push(status::META_TRACK_NAME);
    track.push(name.len() as u8);
    track.extend_from_slice(name.as_bytes());
    Ok(())
}

/// Append a variable-length-quantity delta time: 7 data bits per byte,
/// most significant first, high bit set on every byte except the last.
fn write_delta(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 5];
    let mut idx = buf.len() - 1;
    buf[idx] = (value & 0x7F) as u8;
    let mut rest = value >> 7;
    while rest > 0 {
        idx -= 1;
        buf[idx] = ((rest & 0x7F) as u8) | 0x80;
        rest >>= 7;
    }
    out.extend_from_slice(&buf[idx..]);
}
