//! Canonical ingredient forms.
//!
//! Spoken ingredient phrases ("Cherry Tomatoes", "two eggs", "sea salt") are
//! reduced to the lower-cased, singular form stored in each recipe's
//! canonical ingredient set. The catalog loader and the matcher both go
//! through [`normalize`], so corpus and query can never drift apart.

/// Ingredients every kitchen is assumed to have. They never take part in
/// matching.
pub const STOPLIST: [&str; 3] = ["water", "salt", "pepper"];

/// Words that look plural but are not.
const INVARIANT: &[&str] = &[
    "asparagus",
    "citrus",
    "couscous",
    "grits",
    "hummus",
    "molasses",
    "octopus",
    "series",
    "species",
    "swiss",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("halves", "half"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("mice", "mouse"),
    ("teeth", "tooth"),
];

/// Plurals of nouns whose singular ends in `-ie`, which the `-ies` rule
/// would otherwise turn into `-y`.
const IE_PLURALS: &[&str] = &[
    "brownies",
    "calories",
    "cookies",
    "pies",
    "smoothies",
    "veggies",
];

/// Plurals of nouns whose singular ends in `-che` or `-oe`, which the
/// `-ches` and `-oes` rules would otherwise cut back too far.
const E_PLURALS: &[&str] = &[
    "brioches",
    "caches",
    "cloches",
    "ganaches",
    "niches",
    "panaches",
    "quiches",
    "sloes",
];

/// Reduce a spoken ingredient phrase to its canonical form.
///
/// Returns `None` for blank phrases and for stoplisted ingredients; callers
/// drop those entirely.
///
/// ```rust
/// use food_world::recipes::normalize;
///
/// assert_eq!(normalize("Cherry Tomatoes").as_deref(), Some("cherry tomato"));
/// assert_eq!(normalize("egg").as_deref(), Some("egg"));
/// assert_eq!(normalize("Sea Salt"), None);
/// ```
pub fn normalize(phrase: &str) -> Option<String> {
    let lowered = phrase.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    let last = tokens.pop()?;

    if is_stoplisted(last) {
        return None;
    }

    let singular = singularize(last);
    let last = singular.as_deref().unwrap_or(last);
    if is_stoplisted(last) {
        return None;
    }

    tokens.push(last);
    Some(tokens.join(" "))
}

fn is_stoplisted(token: &str) -> bool {
    STOPLIST.contains(&token)
}

/// Rule-based plural to singular conversion of a single lower-cased token.
///
/// Returns `None` when no plural rule applies, meaning the token is already
/// singular (or unknown) and is used as is.
pub fn singularize(token: &str) -> Option<String> {
    if token.chars().count() < 3 || INVARIANT.contains(&token) {
        return None;
    }

    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == token) {
        return Some((*singular).to_string());
    }

    if IE_PLURALS.contains(&token) || E_PLURALS.contains(&token) {
        return token.strip_suffix('s').map(str::to_string);
    }

    if let Some(stem) = token.strip_suffix("ies") {
        return Some(format!("{stem}y"));
    }

    if let Some(stem) = token.strip_suffix("oes") {
        return Some(format!("{stem}o"));
    }

    // "fizzes" drops "es"; "glazes" only drops "s".
    if let Some(stem) = token.strip_suffix("es").filter(|stem| stem.ends_with('z')) {
        return Some(if stem.ends_with("zz") {
            stem.to_string()
        } else {
            format!("{stem}e")
        });
    }

    for suffix in ["ches", "shes", "sses", "xes"] {
        if token.ends_with(suffix) {
            return Some(token[..token.len() - 2].to_string());
        }
    }

    let stem = token.strip_suffix('s')?;
    if stem.ends_with('s') || stem.ends_with('u') {
        return None;
    }
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_forms_are_fixed_points() {
        for word in [
            "egg",
            "flour",
            "tomato",
            "peach",
            "cheese",
            "leaf",
            "cherry",
            "lettuce",
            "molasses",
            "asparagus",
            "swiss cheese",
            "bass",
            "cookie",
            "pie",
            "quiche",
            "brioche",
            "glaze",
        ] {
            assert_eq!(normalize(word).as_deref(), Some(word), "{word}");
        }
    }

    #[test]
    fn test_user_plurals_meet_corpus_singulars() {
        for (plural, singular) in [
            ("Quiches", "quiche"),
            ("spinach quiches", "spinach quiche"),
            ("brioches", "brioche"),
            ("sloes", "sloe"),
            ("glazes", "glaze"),
        ] {
            assert_eq!(normalize(plural), normalize(singular), "{plural}");
        }
    }

    #[test]
    fn test_plural_rules() {
        let cases = [
            ("eggs", "egg"),
            ("Tomatoes", "tomato"),
            ("cherries", "cherry"),
            ("peaches", "peach"),
            ("radishes", "radish"),
            ("boxes", "box"),
            ("cheeses", "cheese"),
            ("leaves", "leaf"),
            ("cookies", "cookie"),
            ("pies", "pie"),
            ("peas", "pea"),
            ("avocados", "avocado"),
            ("quiches", "quiche"),
            ("brioches", "brioche"),
            ("ganaches", "ganache"),
            ("sloes", "sloe"),
            ("potatoes", "potato"),
            ("glazes", "glaze"),
            ("fizzes", "fizz"),
            ("sandwiches", "sandwich"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize(input).as_deref(), Some(expected), "{input}");
        }
    }

    #[test]
    fn test_only_last_token_is_singularized() {
        assert_eq!(
            normalize("  Green   Beans ").as_deref(),
            Some("green bean")
        );
        assert_eq!(
            normalize("brussels sprouts").as_deref(),
            Some("brussels sprout")
        );
    }

    #[test]
    fn test_stoplist_is_dropped_regardless_of_case_or_phrase() {
        for phrase in [
            "water",
            "Salt",
            "PEPPER",
            "sea salt",
            "black pepper",
            "cold Water",
            "salts",
        ] {
            assert_eq!(normalize(phrase), None, "{phrase}");
        }
    }

    #[test]
    fn test_stoplist_only_applies_to_last_token() {
        assert_eq!(
            normalize("pepper jack cheese").as_deref(),
            Some("pepper jack cheese")
        );
    }

    #[test]
    fn test_blank_phrase() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
    }

    #[test]
    fn test_short_tokens_are_left_alone() {
        assert_eq!(singularize("as"), None);
        assert_eq!(singularize("ss"), None);
    }
}
