use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the site's language table
///
/// Site languages are ISO 639-1 codes, optionally followed by a region
/// subtag (`zh-TW`, `pt-BR`). Three-letter ISO 639-3 codes are accepted
/// for languages without a two-letter code.

/// Split a code into its lowercase base and optional uppercase region
fn split_code(code: &str) -> (String, Option<String>) {
    let trimmed = code.trim().replace('_', "-");
    let mut parts = trimmed.splitn(2, '-');
    let base = parts.next().unwrap_or_default().to_lowercase();
    let region = parts
        .next()
        .filter(|r| !r.is_empty())
        .map(|r| r.to_uppercase());
    (base, region)
}

fn lookup(base: &str) -> Option<Language> {
    match base.len() {
        2 => Language::from_639_1(base),
        3 => Language::from_639_3(base),
        _ => None,
    }
}

/// Validate a language code and return its canonical form
pub fn normalize_language_code(code: &str) -> Result<String> {
    let (base, region) = split_code(code);

    if lookup(&base).is_none() {
        return Err(anyhow!("Invalid language code: {}", code));
    }

    Ok(match region {
        Some(region) => format!("{}-{}", base, region),
        None => base,
    })
}

/// Check whether a code names a known language
pub fn is_valid_language_code(code: &str) -> bool {
    normalize_language_code(code).is_ok()
}

/// Check if two language codes match (same base language and region)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_language_code(code1), normalize_language_code(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let (base, region) = split_code(code);
    let lang = lookup(&base).ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(match region {
        Some(region) => format!("{} ({})", lang.to_name(), region),
        None => lang.to_name().to_string(),
    })
}

/// Get the language's own name for itself, falling back to the English name
pub fn get_native_name(code: &str) -> Result<String> {
    let (base, _) = split_code(code);
    let lang = lookup(&base).ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang
        .to_autonym()
        .map(|name| name.to_string())
        .unwrap_or_else(|| lang.to_name().to_string()))
}
