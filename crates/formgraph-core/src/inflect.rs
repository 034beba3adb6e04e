//! # Inflection
//!
//! English singular/plural conversion for field names, used to name
//! anonymous child model types (`friends` → `friend`) and to derive host
//! submission aliases (`friend` → `friends_attributes`).
//!
//! The rule set covers the regular suffix classes plus tables of irregular
//! and uncountable words, matching the forms Rails-style hosts emit for
//! nested attribute keys (`matrix` → `matrices_attributes`). It operates on
//! the last `_`-separated word of a snake_case identifier, so
//! `best_friends` → `best_friend`.

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("index", "indices"),
    ("analysis", "analyses"),
    ("diagnosis", "diagnoses"),
    ("synopsis", "synopses"),
    ("thesis", "theses"),
    ("crisis", "crises"),
    ("axis", "axes"),
    ("datum", "data"),
    ("medium", "media"),
    ("criterion", "criteria"),
    ("quiz", "quizzes"),
    ("half", "halves"),
    ("knife", "knives"),
    ("life", "lives"),
    ("wife", "wives"),
    ("leaf", "leaves"),
    ("shelf", "shelves"),
    ("wolf", "wolves"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "news",
    "police",
];

/// Plural form of a snake_case identifier. Already-plural words are returned unchanged.
pub fn pluralize(word: &str) -> String {
    map_last_word(word, |last| {
        let lower = last.to_ascii_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return last.to_string();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(s, p)| *s == lower || *p == lower) {
            return (*plural).to_string();
        }
        let singular = singularize_word(last);
        pluralize_word(&singular)
    })
}

/// Singular form of a snake_case identifier. Already-singular words are returned unchanged.
pub fn singularize(word: &str) -> String {
    map_last_word(word, |last| {
        let lower = last.to_ascii_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return last.to_string();
        }
        if let Some((singular, _)) = IRREGULAR.iter().find(|(s, p)| *s == lower || *p == lower) {
            return (*singular).to_string();
        }
        singularize_word(last)
    })
}

/// snake_case form of a CamelCase or mixed identifier (`FriendForm` → `friend_form`).
pub fn underscore(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let mut prev_lower = false;
    for c in word.chars() {
        if c == '-' || c == ' ' || c == ':' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

fn map_last_word(word: &str, f: impl FnOnce(&str) -> String) -> String {
    match word.rfind('_') {
        Some(pos) if pos + 1 < word.len() => {
            format!("{}{}", &word[..=pos], f(&word[pos + 1..]))
        }
        _ if word.is_empty() => String::new(),
        _ => f(word),
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn pluralize_word(word: &str) -> String {
    let bytes = word.as_bytes();
    let n = bytes.len();
    if n >= 2 && bytes[n - 1] == b'y' && !is_vowel(bytes[n - 2]) {
        return format!("{}ies", &word[..n - 1]);
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

fn singularize_word(word: &str) -> String {
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "xes", "zes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singularizes_regular_plurals() {
        assert_eq!(singularize("friends"), "friend");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("matches"), "match");
    }

    #[test]
    fn singular_words_are_unchanged() {
        assert_eq!(singularize("friend"), "friend");
        assert_eq!(singularize("address"), "address");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("account"), "account");
    }

    #[test]
    fn pluralizes_and_is_idempotent() {
        assert_eq!(pluralize("friend"), "friends");
        assert_eq!(pluralize("friends"), "friends");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("categories"), "categories");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("box"), "boxes");
    }

    #[test]
    fn irregular_and_uncountable() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("people"), "people");
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("sheep"), "sheep");
        assert_eq!(pluralize("equipment"), "equipment");
    }

    #[test]
    fn latin_greek_and_f_plurals() {
        for (singular, plural) in [
            ("matrix", "matrices"),
            ("index", "indices"),
            ("analysis", "analyses"),
            ("crisis", "crises"),
            ("datum", "data"),
            ("criterion", "criteria"),
            ("quiz", "quizzes"),
            ("shelf", "shelves"),
            ("life", "lives"),
        ] {
            assert_eq!(pluralize(singular), plural);
            assert_eq!(pluralize(plural), plural);
            assert_eq!(singularize(plural), singular);
        }
        assert_eq!(pluralize("sales_analysis"), "sales_analyses");
        assert_eq!(singularize("analysis"), "analysis");
    }

    #[test]
    fn only_last_snake_case_word_is_inflected() {
        assert_eq!(singularize("best_friends"), "best_friend");
        assert_eq!(pluralize("line_item"), "line_items");
        assert_eq!(pluralize("line_items"), "line_items");
    }

    #[test]
    fn underscore_camel_case() {
        assert_eq!(underscore("FriendForm"), "friend_form");
        assert_eq!(underscore("user"), "user");
        assert_eq!(underscore("Admin::UserForm"), "admin_user_form");
    }
}
