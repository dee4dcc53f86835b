//! AGLDT positional morphology tags
//!
//! A tag is exactly nine characters, one per category:
//! part of speech, person, number, tense, mood, voice, gender, case, degree.
//! `-` leaves a category unset.

use thiserror::Error;

/// Number of positions in a well-formed tag
pub const TAG_LEN: usize = 9;

/// Error decoding a morphology tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MorphError {
    #[error("tag {tag:?} has {found} positions, expected 9")]
    Length { tag: String, found: usize },

    #[error("unknown code {code:?} for {category} in tag {tag:?}")]
    UnknownCode {
        tag: String,
        category: &'static str,
        code: char,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Article,
    Particle,
    Conjunction,
    Preposition,
    Pronoun,
    Numeral,
    Exclamation,
    Punctuation,
    Irregular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Person {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    Singular,
    Plural,
    Dual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tense {
    Present,
    Imperfect,
    Perfect,
    Pluperfect,
    FuturePerfect,
    Future,
    Aorist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Indicative,
    Subjunctive,
    Optative,
    Infinitive,
    Imperative,
    Participle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    Active,
    Passive,
    Middle,
    Mediopassive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    Nominative,
    Genitive,
    Dative,
    Accusative,
    Vocative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degree {
    Comparative,
    Superlative,
}

/// Decoded morphology; `None` for unset categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Morph {
    pub pos: Option<PartOfSpeech>,
    pub person: Option<Person>,
    pub number: Option<Number>,
    pub tense: Option<Tense>,
    pub mood: Option<Mood>,
    pub voice: Option<Voice>,
    pub gender: Option<Gender>,
    pub case: Option<Case>,
    pub degree: Option<Degree>,
}

/// Map one tag position; `-` is unset, anything unmapped is an error
fn field<T>(
    tag: &str,
    category: &'static str,
    code: char,
    map: impl Fn(char) -> Option<T>,
) -> Result<Option<T>, MorphError> {
    if code == '-' {
        return Ok(None);
    }
    map(code).map(Some).ok_or_else(|| MorphError::UnknownCode {
        tag: tag.to_string(),
        category,
        code,
    })
}

impl Morph {
    /// Decode a nine-position tag
    pub fn decode(tag: &str) -> Result<Self, MorphError> {
        let codes: Vec<char> = tag.chars().collect();
        if codes.len() != TAG_LEN {
            return Err(MorphError::Length {
                tag: tag.to_string(),
                found: codes.len(),
            });
        }

        Ok(Self {
            pos: field(tag, "part of speech", codes[0], |c| match c {
                'n' => Some(PartOfSpeech::Noun),
                'v' | 't' => Some(PartOfSpeech::Verb),
                'a' => Some(PartOfSpeech::Adjective),
                'd' => Some(PartOfSpeech::Adverb),
                'l' => Some(PartOfSpeech::Article),
                'g' => Some(PartOfSpeech::Particle),
                'c' => Some(PartOfSpeech::Conjunction),
                'r' => Some(PartOfSpeech::Preposition),
                'p' => Some(PartOfSpeech::Pronoun),
                'm' => Some(PartOfSpeech::Numeral),
                'i' | 'e' => Some(PartOfSpeech::Exclamation),
                'u' => Some(PartOfSpeech::Punctuation),
                'x' => Some(PartOfSpeech::Irregular),
                _ => None,
            })?,
            person: field(tag, "person", codes[1], |c| match c {
                '1' => Some(Person::First),
                '2' => Some(Person::Second),
                '3' => Some(Person::Third),
                _ => None,
            })?,
            number: field(tag, "number", codes[2], |c| match c {
                's' => Some(Number::Singular),
                'p' => Some(Number::Plural),
                'd' => Some(Number::Dual),
                _ => None,
            })?,
            tense: field(tag, "tense", codes[3], |c| match c {
                'p' => Some(Tense::Present),
                'i' => Some(Tense::Imperfect),
                'r' => Some(Tense::Perfect),
                'l' => Some(Tense::Pluperfect),
                't' => Some(Tense::FuturePerfect),
                'f' => Some(Tense::Future),
                'a' => Some(Tense::Aorist),
                _ => None,
            })?,
            mood: field(tag, "mood", codes[4], |c| match c {
                'i' => Some(Mood::Indicative),
                's' => Some(Mood::Subjunctive),
                'o' => Some(Mood::Optative),
                'n' => Some(Mood::Infinitive),
                'm' => Some(Mood::Imperative),
                'p' => Some(Mood::Participle),
                _ => None,
            })?,
            voice: field(tag, "voice", codes[5], |c| match c {
                'a' => Some(Voice::Active),
                'p' => Some(Voice::Passive),
                'm' => Some(Voice::Middle),
                'e' => Some(Voice::Mediopassive),
                _ => None,
            })?,
            gender: field(tag, "gender", codes[6], |c| match c {
                'm' => Some(Gender::Masculine),
                'f' => Some(Gender::Feminine),
                'n' => Some(Gender::Neuter),
                _ => None,
            })?,
            case: field(tag, "case", codes[7], |c| match c {
                'n' => Some(Case::Nominative),
                'g' => Some(Case::Genitive),
                'd' => Some(Case::Dative),
                'a' => Some(Case::Accusative),
                'v' => Some(Case::Vocative),
                _ => None,
            })?,
            degree: field(tag, "degree", codes[8], |c| match c {
                'c' => Some(Degree::Comparative),
                's' => Some(Degree::Superlative),
                _ => None,
            })?,
        })
    }
}
