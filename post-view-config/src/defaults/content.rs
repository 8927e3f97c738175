pub fn base_url() -> String {
    "http://localhost:3000".to_string()
}

pub fn timeout_secs() -> u64 {
    30
}

/// 10 MB; cooked post bodies are far below this.
pub fn max_response_bytes() -> u64 {
    10 * 1024 * 1024
}
