//! URL slug generation.
//!
//! Titles become lowercase, transliterated, hyphen-separated identifiers.
//! Collisions are not resolved here: the repository surfaces `DuplicateSlug`
//! when the storage layer rejects the insert.

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 100;

/// Cyrillic-to-Latin transliteration table (Ukrainian national standard,
/// simplified). Characters without an entry fall through to the filter step.
const TRANSLIT: &[(char, &str)] = &[
    ('а', "a"),
    ('б', "b"),
    ('в', "v"),
    ('г', "h"),
    ('ґ', "g"),
    ('д', "d"),
    ('е', "e"),
    ('є', "ie"),
    ('ж', "zh"),
    ('з', "z"),
    ('и', "y"),
    ('і', "i"),
    ('ї', "i"),
    ('й', "i"),
    ('к', "k"),
    ('л', "l"),
    ('м', "m"),
    ('н', "n"),
    ('о', "o"),
    ('п', "p"),
    ('р', "r"),
    ('с', "s"),
    ('т', "t"),
    ('у', "u"),
    ('ф', "f"),
    ('х', "kh"),
    ('ц', "ts"),
    ('ч', "ch"),
    ('ш', "sh"),
    ('щ', "shch"),
    ('ь', ""),
    ('ю', "iu"),
    ('я', "ia"),
    ('ы', "y"),
    ('э', "e"),
    ('ё', "e"),
    ('ъ', ""),
];

fn transliterate(c: char) -> Option<&'static str> {
    TRANSLIT.iter().find(|(from, _)| *from == c).map(|(_, to)| *to)
}

/// Generate a URL-safe slug from a title.
///
/// Deterministic: identical input always yields an identical slug. The
/// result contains only lowercase ASCII letters, digits, and single hyphens,
/// never starts or ends with a hyphen, and is at most [`MAX_SLUG_LEN`]
/// characters long.
pub fn generate_slug(title: &str) -> String {
    let mut normalized = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        match transliterate(c) {
            Some(latin) => normalized.push_str(latin),
            None if c.is_ascii_alphanumeric() => normalized.push(c),
            None if c.is_whitespace() || c == '-' => normalized.push('-'),
            None => {}
        }
    }

    let mut slug = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        if c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else {
            slug.push(c);
        }
    }

    if slug.chars().count() > MAX_SLUG_LEN {
        slug = slug.chars().take(MAX_SLUG_LEN).collect();
    }
    slug.trim_end_matches('-').to_string()
}
