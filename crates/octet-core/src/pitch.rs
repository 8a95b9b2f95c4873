//! Pitch-name parsing ("C4", "F#3", "Bb2") to MIDI note numbers

/// Note substituted when a pitch name fails to parse (middle C).
///
/// Resolution never errors on a bad pitch name; forward progress wins
/// over correctness at this boundary.
pub const FALLBACK_NOTE: u8 = 60;

/// MIDI note number for a pitch name, falling back to [`FALLBACK_NOTE`].
pub fn midi_note(name: &str) -> u8 {
    parse(name).unwrap_or(FALLBACK_NOTE)
}

fn parse(name: &str) -> Option<u8> {
    // Chord spellings sometimes carry a '-' ("C-add9"); strip it before
    // matching.
    let cleaned: String = name.chars().filter(|&c| c != '-').collect();
    let mut chars = cleaned.chars().peekable();

    let letter = chars.next()?;
    let accidental = match chars.peek() {
        Some(&c @ ('#' | 'b')) => {
            chars.next();
            Some(c)
        }
        _ => None,
    };
    let class = pitch_class(letter, accidental)?;

    let octave_digits: String = chars.collect();
    if octave_digits.is_empty() || !octave_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let octave: i32 = octave_digits.parse().ok()?;

    let note = class + (octave + 1) * 12;
    if !(0..=127).contains(&note) {
        return None;
    }
    Some(note as u8)
}

fn pitch_class(letter: char, accidental: Option<char>) -> Option<i32> {
    let class = match (letter, accidental) {
        ('C', None) => 0,
        ('C', Some('#')) | ('D', Some('b')) => 1,
        ('D', None) => 2,
        ('D', Some('#')) | ('E', Some('b')) => 3,
        ('E', None) => 4,
        ('F', None) => 5,
        ('F', Some('#')) | ('G', Some('b')) => 6,
        ('G', None) => 7,
        ('G', Some('#')) | ('A', Some('b')) => 8,
        ('A', None) => 9,
        ('A', Some('#')) | ('B', Some('b')) => 10,
        ('B', None) => 11,
        _ => return None,
    };
    Some(class)
}
