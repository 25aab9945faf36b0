use darling::FromMeta;

/// Member naming applied to every field identifier of a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameRule {
    PascalCase,
    CamelCase,
    SnakeCase,
    LowerCase,
    UpperCase,
}

impl FromMeta for RenameRule {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value {
            "PascalCase" => Ok(RenameRule::PascalCase),
            "camelCase" => Ok(RenameRule::CamelCase),
            "snake_case" => Ok(RenameRule::SnakeCase),
            "lowercase" => Ok(RenameRule::LowerCase),
            "UPPERCASE" => Ok(RenameRule::UpperCase),
            other => Err(darling::Error::unknown_value(other)),
        }
    }
}

impl RenameRule {
    /// Renames a snake_case field identifier.
    pub(crate) fn apply(&self, field: &str) -> String {
        let words = field.split('_').filter(|word| !word.is_empty());
        match self {
            RenameRule::PascalCase => words.map(capitalize).collect(),
            RenameRule::CamelCase => words
                .enumerate()
                .map(|(i, word)| if i == 0 { word.to_lowercase() } else { capitalize(word) })
                .collect(),
            RenameRule::SnakeCase => words.map(str::to_lowercase).collect::<Vec<_>>().join("_"),
            RenameRule::LowerCase => words.map(str::to_lowercase).collect(),
            RenameRule::UpperCase => words.map(str::to_uppercase).collect(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The identifier as written, without a raw `r#` prefix.
pub(crate) fn unraw(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_owned(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::RenameRule;

    #[test]
    fn renames_field_identifiers() {
        assert_eq!(RenameRule::PascalCase.apply("small_integer"), "SmallInteger");
        assert_eq!(RenameRule::CamelCase.apply("small_integer"), "smallInteger");
        assert_eq!(RenameRule::SnakeCase.apply("small_integer"), "small_integer");
        assert_eq!(RenameRule::LowerCase.apply("small_integer"), "smallinteger");
        assert_eq!(RenameRule::UpperCase.apply("small_integer"), "SMALLINTEGER");
        assert_eq!(RenameRule::PascalCase.apply("guid"), "Guid");
    }
}
