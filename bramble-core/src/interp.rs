use crate::vars::VarStore;

/// Substitute `{{ name }}` tokens against the store in one left-to-right
/// pass. Whitespace inside the delimiters is dropped when forming the
/// name, an absent name substitutes to the empty string, and anything
/// malformed stays verbatim: a stray `{` or `}` is literal text, and an
/// opener with no matching `}}` leaves the whole remainder untouched.
/// A `}` only closes the token when the next byte is another `}`.
pub fn scan_substitute(input: &str, store: &VarStore) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut lit = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' && bytes.get(i + 1) == Some(&b'{') {
            let Some(end) = find_close(bytes, i + 2) else {
                break;
            };
            out.push_str(&input[lit..i]);
            let name: String = input[i + 2..end].split_whitespace().collect();
            if let Some(value) = store.raw(&name) {
                out.push_str(value);
            }
            i = end + 2;
            lit = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&input[lit..]);
    out
}

fn find_close(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i + 1 < bytes.len() {
        if bytes[i] == b'}' && bytes[i + 1] == b'}' {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::Value;

    fn store(pairs: &[(&str, &str)]) -> VarStore {
        let mut store = VarStore::new();
        for (key, value) in pairs {
            store.insert(*key, Value::text(*value));
        }
        store
    }

    #[test]
    fn substitutes_and_recovers() {
        let vars = store(&[
            ("myName", "Kaleb"),
            ("projN", "Testing"),
            ("greeting", "Hello"),
            ("firstPart", "Hel"),
            ("lastPart", "lo"),
        ]);
        let cases = [
            ("Hello", "Hello"),
            ("Hello {{ myName }}", "Hello Kaleb"),
            ("Hello {{myName }}", "Hello Kaleb"),
            ("Hello {{ myName}}", "Hello Kaleb"),
            ("Hello {{ myName\t\t}}", "Hello Kaleb"),
            (
                "Hello {{ myName }}. Welcome to {{ projN }}",
                "Hello Kaleb. Welcome to Testing",
            ),
            // Unclosed opener: remainder stays verbatim.
            (
                "Hello {{ myName }}. Welcome to {{ projN }",
                "Hello Kaleb. Welcome to {{ projN }",
            ),
            // Single braces never open or close a token.
            (
                "Hello {{ myName }}. Welcome to { projN }",
                "Hello Kaleb. Welcome to { projN }",
            ),
            (
                "Hello { myName }}. Welcome to { projN }",
                "Hello { myName }}. Welcome to { projN }",
            ),
            (
                "{{ greeting }}. It's good to see you, {{ myName }}. Welcome to {{ projN }}",
                "Hello. It's good to see you, Kaleb. Welcome to Testing",
            ),
            (
                "{{ greeting }} {{ myName }}. Welcome to {{ projN }}",
                "Hello Kaleb. Welcome to Testing",
            ),
            // Adjacent tokens with no separating text both resolve.
            (
                "{{ firstPart }}{{ lastPart }}, {{myName}}. Welcome to {{ projN }}",
                "Hello, Kaleb. Welcome to Testing",
            ),
        ];
        for (input, expect) in cases {
            assert_eq!(scan_substitute(input, &vars), expect, "input: {input}");
        }
    }

    #[test]
    fn unknown_name_becomes_empty() {
        let vars = store(&[("myName", "Kaleb")]);
        assert_eq!(scan_substitute("Hi {{ nobody }}!", &vars), "Hi !");
        assert_eq!(scan_substitute("{{}}", &vars), "");
    }

    #[test]
    fn lone_close_is_literal_inside_name() {
        // A single `}` followed by a non-`}` byte is part of the name.
        let vars = store(&[("a}b", "joined")]);
        assert_eq!(scan_substitute("x {{ a}b }} y", &vars), "x joined y");
    }

    #[test]
    fn whitespace_inside_name_is_dropped() {
        let vars = store(&[("myName", "Kaleb")]);
        assert_eq!(scan_substitute("{{ my Name }}", &vars), "Kaleb");
    }

    #[test]
    fn multibyte_text_passes_through() {
        let vars = store(&[("who", "Kaleb")]);
        assert_eq!(
            scan_substitute("héllø {{ who }} — fin", &vars),
            "héllø Kaleb — fin"
        );
    }
}
