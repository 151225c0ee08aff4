//! The fixed note set
//!
//! Seven diatonic scale letters in canonical (scale) order. Each note is bound
//! to exactly one audio clip; the default file names follow the fourth-octave
//! recordings shipped under `data/sound`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the seven diatonic scale letters.
///
/// Declaration order is the canonical scale order, so `Ord` sorts notes the
/// way the scale is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Note {
    /// All notes in canonical scale order
    pub const ALL: [Note; 7] = [
        Note::C,
        Note::D,
        Note::E,
        Note::F,
        Note::G,
        Note::A,
        Note::B,
    ];

    /// Reference note replayed before each target (first scale note)
    pub const CUE: Note = Note::C;

    /// Letter name as typed by the player
    pub fn letter(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::D => "D",
            Note::E => "E",
            Note::F => "F",
            Note::G => "G",
            Note::A => "A",
            Note::B => "B",
        }
    }

    /// Position in the canonical scale (C = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Default clip file name relative to the sound directory
    pub fn default_clip_file(self) -> &'static str {
        match self {
            Note::C => "c4.mp3",
            Note::D => "d4.mp3",
            Note::E => "e4.mp3",
            Note::F => "f4.mp3",
            Note::G => "g4.mp3",
            Note::A => "a4.mp3",
            Note::B => "b4.mp3",
        }
    }

    /// Normalize raw player input the way guesses are compared:
    /// surrounding whitespace trimmed, letters uppercased.
    pub fn normalize_guess(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    /// Whether `raw` names this note after normalization.
    ///
    /// Exact match only: "c" and " C " match `C`, "C#" and "Do" do not.
    pub fn matches_guess(self, raw: &str) -> bool {
        Self::normalize_guess(raw) == self.letter()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for Note {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = Self::normalize_guess(s);
        Note::ALL
            .into_iter()
            .find(|note| note.letter() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown note: {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let letters: Vec<&str> = Note::ALL.iter().map(|n| n.letter()).collect();
        assert_eq!(letters, vec!["C", "D", "E", "F", "G", "A", "B"]);

        let mut sorted = Note::ALL;
        sorted.sort();
        assert_eq!(sorted, Note::ALL);

        for (idx, note) in Note::ALL.iter().enumerate() {
            assert_eq!(note.index(), idx);
        }
    }

    #[test]
    fn test_cue_is_first_scale_note() {
        assert_eq!(Note::CUE, Note::ALL[0]);
    }

    #[test]
    fn test_guess_matching_is_trimmed_and_case_insensitive() {
        assert!(Note::G.matches_guess("g"));
        assert!(Note::G.matches_guess("  G\t"));
        assert!(Note::G.matches_guess("\ng \n"));
        assert!(!Note::G.matches_guess("A"));
        assert!(!Note::G.matches_guess("G#"));
        assert!(!Note::G.matches_guess("gg"));
        assert!(!Note::G.matches_guess(""));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("e".parse::<Note>().unwrap(), Note::E);
        assert_eq!(" B ".parse::<Note>().unwrap(), Note::B);
        assert!("H".parse::<Note>().is_err());
        assert!("".parse::<Note>().is_err());
    }

    #[test]
    fn test_default_clip_files_are_distinct() {
        let mut files: Vec<&str> = Note::ALL.iter().map(|n| n.default_clip_file()).collect();
        files.dedup();
        assert_eq!(files.len(), 7);
        assert_eq!(Note::A.default_clip_file(), "a4.mp3");
    }
}
