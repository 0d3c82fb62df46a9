/*!
 * Translation cache keys.
 *
 * A key identifies one (page, section, target language) unit and is the
 * lookup handle for stored translations: `page:section:language`.
 */

use std::fmt;

use crate::errors::InputError;

/// Separator between the three key parts
pub const KEY_SEPARATOR: char = ':';

/// Build the cache key for a (page, section, language) triple
pub fn compute_key(page_name: &str, section_context: &str, target_language: &str) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        page_name,
        section_context,
        target_language,
        sep = KEY_SEPARATOR
    )
}

/// Check that a page, section or language name can be one part of a key
pub fn validate_key_part(part: &str) -> Result<(), InputError> {
    if part.is_empty() {
        return Err(InputError::InvalidKey("key parts must not be empty".to_string()));
    }
    if part.contains(KEY_SEPARATOR) {
        return Err(InputError::InvalidKey(format!(
            "'{}' contains '{}'",
            part, KEY_SEPARATOR
        )));
    }
    Ok(())
}

/// Structured form of a translation key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub page_name: String,
    pub section_context: String,
    pub target_language: String,
}

impl TranslationKey {
    /// Build a key, rejecting empty parts and parts containing the separator
    pub fn new(
        page_name: impl Into<String>,
        section_context: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Result<Self, InputError> {
        let key = Self {
            page_name: page_name.into(),
            section_context: section_context.into(),
            target_language: target_language.into(),
        };

        for part in [&key.page_name, &key.section_context, &key.target_language] {
            validate_key_part(part)?;
        }

        Ok(key)
    }

    /// Split `page:section:language` back into its parts
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let parts: Vec<&str> = text.split(KEY_SEPARATOR).collect();
        match parts.as_slice() {
            [page, section, language] => Self::new(*page, *section, *language),
            _ => Err(InputError::InvalidKey(format!(
                "expected page{sep}section{sep}language, got '{}'",
                text,
                sep = KEY_SEPARATOR
            ))),
        }
    }
}

impl fmt::Display for TranslationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&compute_key(
            &self.page_name,
            &self.section_context,
            &self.target_language,
        ))
    }
}

impl std::str::FromStr for TranslationKey {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
