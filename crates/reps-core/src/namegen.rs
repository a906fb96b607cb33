use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "adaptable", "adventurous", "ambitious", "amusing", "agreeable", "brave", "bright", "calm",
    "charming", "considerate", "courageous", "creative", "decisive", "diligent", "diplomatic",
    "discreet", "dynamic", "enthusiastic", "exuberant", "faithful", "fearless", "friendly",
    "funny", "generous", "gentle", "gregarious", "helpful", "honest", "humorous", "imaginative",
    "impartial", "independent", "intellectual", "kind", "loyal", "neat", "nice", "passionate",
    "persistent", "polite", "powerful", "quiet", "rational", "reliable", "thoughtful", "tidy",
];

const NOUNS: &[&str] = &[
    "Ada", "ALGOL", "Awk", "Bash", "BASIC", "BCPL", "C", "C++", "C#", "Chapel", "COBOL",
    "Crystal", "D", "Dart", "Eiffel", "Elixir", "Elm", "Erlang", "F#", "Forth", "Fortran",
    "Go", "Haskell", "Haxe", "Idris", "Java", "JavaScript", "Julia", "Kotlin", "Lisp", "Lua",
    "Nim", "OCaml", "Pascal", "Perl", "PHP", "Prolog", "Python", "R", "Racket", "Ruby", "Rust",
    "Scala", "Scheme", "Smalltalk", "SML", "Swift", "Tcl", "TypeScript", "Zig",
];

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Random "Adjective Noun" display name for an anonymous visitor.
pub fn pseudonym() -> String {
    pseudonym_with(&mut rand::rng())
}

pub fn pseudonym_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    format!("{} {}", title_case(adjective), title_case(noun))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn names_are_two_title_cased_words() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let name = pseudonym_with(&mut rng);
            let parts: Vec<&str> = name.split(' ').collect();
            assert_eq!(parts.len(), 2, "{name}");
            assert!(parts[0].chars().next().unwrap().is_uppercase());
            assert!(ADJECTIVES.iter().any(|a| title_case(a) == parts[0]));
            assert!(NOUNS.contains(&parts[1]));
        }
    }

    #[test]
    fn title_case_keeps_the_tail() {
        assert_eq!(title_case("calm"), "Calm");
        assert_eq!(title_case("ALGOL"), "ALGOL");
        assert_eq!(title_case(""), "");
    }
}
