pub fn follow_quote() -> String {
    "go to the quoted post".to_string()
}

pub fn expand_collapse() -> String {
    "expand/collapse".to_string()
}

pub fn loading() -> String {
    "Loading...".to_string()
}

pub fn clicks() -> String {
    "clicks".to_string()
}

pub fn select() -> String {
    "select".to_string()
}

/// `{count}` is replaced with the number of selected posts.
pub fn selected() -> String {
    "selected ({count})".to_string()
}
