//! Member naming conventions.
//!
//! A convention splits a name into words and joins words back under its own rules. Field paths
//! are rewritten for exactly one pair: a lower-underscore source (`small_integer`) with any other
//! destination convention. Every other pair passes names through unchanged.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NamingConvention {
    /// Names are a single word and used as they are.
    #[default]
    Exact,
    /// `SmallInteger`
    PascalCase,
    /// `smallInteger`
    CamelCase,
    /// `small_integer`
    LowerUnderscore,
}

impl NamingConvention {
    pub fn split(&self, name: &str) -> Vec<String> {
        match self {
            NamingConvention::Exact => vec![name.to_owned()],
            NamingConvention::PascalCase | NamingConvention::CamelCase => split_case_words(name),
            NamingConvention::LowerUnderscore => name
                .split('_')
                .filter(|word| !word.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn join<S: AsRef<str>>(&self, words: &[S]) -> String {
        match self {
            NamingConvention::Exact => words.iter().map(AsRef::as_ref).collect(),
            NamingConvention::PascalCase => words.iter().map(|w| capitalize(w.as_ref())).collect(),
            NamingConvention::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    if i == 0 {
                        w.as_ref().to_lowercase()
                    } else {
                        capitalize(w.as_ref())
                    }
                })
                .collect(),
            NamingConvention::LowerUnderscore => words
                .iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

/// The conventions of the source record and the destination type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConventionPair {
    pub source: NamingConvention,
    pub destination: NamingConvention,
}

impl ConventionPair {
    pub fn new(source: NamingConvention, destination: NamingConvention) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Whether this pair rewrites path segments at all.
    pub fn rewrites(&self) -> bool {
        self.source == NamingConvention::LowerUnderscore
            && self.destination != NamingConvention::LowerUnderscore
    }

    /// Rewrites one destination member name into the source's spelling.
    pub fn transform_segment(&self, segment: &str) -> String {
        if !self.rewrites() {
            return segment.to_owned();
        }
        let words = match self.destination {
            // member identifiers have no casing to split on
            NamingConvention::Exact => split_case_words(segment),
            other => other.split(segment),
        };
        self.source.join(&words[..])
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits `HTTPServerName2` into `HTTP`, `Server`, `Name2`.
fn split_case_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
