use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r#"[.,?!;()"'\-]"#).expect("valid regex");
    static ref WS: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","the","and","or","but","if","while","with","of","at","by",
            "for","to","in","on","from","up","down","out","over","under","again",
            "further","then","once","here","there","all","any","both","each","few",
            "more","most","other","some","such","no","nor","not","only","own",
            "same","so","than","too","very","can","will","just",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into index terms: lowercase, punctuation to whitespace, split, drop stopwords.
///
/// Term order follows the input. No stemming is applied, so `trees` and `tree` are distinct.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let spaced = PUNCT.replace_all(&lowered, " ");
    WS.split(&spaced)
        .filter(|w| !w.is_empty() && !is_stopword(w))
        .map(str::to_string)
        .collect()
}
