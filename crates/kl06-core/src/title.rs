//! Multilingual titles.
//!
//! The dataset tags every display string with one of a fixed set of language
//! codes. A canonical [`Title`] holds only languages for which a non-empty
//! string exists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The closed language set of the dataset: an unspecified default plus ten
/// named languages.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  Default,
  Eng,
  Nno,
  Nob,
  Sme,
  Deu,
  Sma,
  Smj,
  Fra,
  Ita,
  Spa,
}

impl Language {
  /// Look up a language by its raw dataset code. Unknown codes return `None`
  /// and the pair is skipped during title assembly.
  pub fn from_code(code: &str) -> Option<Language> {
    match code {
      "default" => Some(Self::Default),
      "eng" => Some(Self::Eng),
      "nno" => Some(Self::Nno),
      "nob" => Some(Self::Nob),
      "sme" => Some(Self::Sme),
      "deu" => Some(Self::Deu),
      "sma" => Some(Self::Sma),
      "smj" => Some(Self::Smj),
      "fra" => Some(Self::Fra),
      "ita" => Some(Self::Ita),
      "spa" => Some(Self::Spa),
      _ => None,
    }
  }
}

/// A mapping from language to non-empty display string.
///
/// Assembly folds `{language, value}` pairs in order — a later pair for the
/// same language overwrites an earlier one — and drops empty-string values.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Title(BTreeMap<Language, String>);

impl Title {
  pub fn new() -> Self { Self::default() }

  /// Fold an iterator of language/value pairs into a canonical title.
  pub fn from_pairs<I>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (Language, String)>,
  {
    let mut title = Self::new();
    for (language, value) in pairs {
      title.set(language, value);
    }
    title
  }

  /// Insert one pair; an empty value removes the language instead.
  pub fn set(&mut self, language: Language, value: String) {
    if value.is_empty() {
      self.0.remove(&language);
    } else {
      self.0.insert(language, value);
    }
  }

  pub fn get(&self, language: Language) -> Option<&str> {
    self.0.get(&language).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
    self.0.iter().map(|(l, v)| (*l, v.as_str()))
  }
}
